use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use std::env;
use std::path::PathBuf;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn gen_rand_string(n: usize) -> String {
    thread_rng().sample_iter(Alphanumeric).take(n).map(char::from).collect()
}

pub fn gen_random_dir() -> PathBuf {
    init();
    let mut dir = env::temp_dir();
    dir.push(String::from("symql"));
    dir.push(gen_rand_string(10));
    dir
}

/// Generates an upper-case hexadecimal identifier of `n` digits that
/// does not start with zero.
pub fn gen_hex_id(n: usize) -> String {
    let mut rng = thread_rng();
    let mut id = String::with_capacity(n);
    for i in 0..n {
        let digit = if i == 0 {
            rng.gen_range(1..16)
        } else {
            rng.gen_range(0..16)
        };
        if let Some(c) = std::char::from_digit(digit, 16) {
            id.push(c.to_ascii_uppercase());
        }
    }
    id
}

/// Generates `n` distinct hexadecimal identifiers of at most `digits` digits.
pub fn gen_distinct_hex_ids(n: usize, digits: usize) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    while ids.len() < n {
        let id = gen_hex_id(digits);
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}
