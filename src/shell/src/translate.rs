use crate::catalog::Catalog;
use common::{Field, SymqlError, TableSchema};
use sqlparser::ast::{
    BinaryOperator, Expr, ObjectName, Query, Select, SelectItem, SetExpr, TableFactor,
    UnaryOperator, Value,
};
use vtab::ConstraintOp;

/// One `column op literal` term of a WHERE conjunction.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: usize,
    pub op: ConstraintOp,
    pub value: Field,
}

/// A single-table query the shell can run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanQuery {
    pub table: String,
    /// Projected columns with their output names.
    pub columns: Vec<(usize, String)>,
    pub predicates: Vec<Predicate>,
    pub limit: Option<usize>,
}

/// Translates a parsed query into a [`ScanQuery`], validating table and
/// column names against the catalog.
pub struct Translator<'a> {
    schema: &'a TableSchema,
    table: String,
}

/// Name of a table. Qualified names are not supported.
fn get_name(name: &ObjectName) -> Result<String, SymqlError> {
    match name.0.as_slice() {
        [single] => Ok(single.clone()),
        _ => Err(SymqlError::ValidationError(String::from(
            "Error no . names supported",
        ))),
    }
}

/// Mirror image of `op`, for literals written on the left.
fn flip(op: ConstraintOp) -> Result<ConstraintOp, SymqlError> {
    match op {
        ConstraintOp::Lt => Ok(ConstraintOp::Gt),
        ConstraintOp::Le => Ok(ConstraintOp::Ge),
        ConstraintOp::Gt => Ok(ConstraintOp::Lt),
        ConstraintOp::Ge => Ok(ConstraintOp::Le),
        ConstraintOp::Eq | ConstraintOp::Ne => Ok(op),
        ConstraintOp::Like | ConstraintOp::NotLike => Err(SymqlError::ValidationError(
            String::from("LIKE needs the column on the left"),
        )),
    }
}

fn binary_operator_to_constraint(op: &BinaryOperator) -> Result<ConstraintOp, SymqlError> {
    match op {
        BinaryOperator::Eq => Ok(ConstraintOp::Eq),
        BinaryOperator::NotEq => Ok(ConstraintOp::Ne),
        BinaryOperator::Lt => Ok(ConstraintOp::Lt),
        BinaryOperator::LtEq => Ok(ConstraintOp::Le),
        BinaryOperator::Gt => Ok(ConstraintOp::Gt),
        BinaryOperator::GtEq => Ok(ConstraintOp::Ge),
        BinaryOperator::Like => Ok(ConstraintOp::Like),
        BinaryOperator::NotLike => Ok(ConstraintOp::NotLike),
        _ => Err(SymqlError::ValidationError(format!(
            "Unsupported binary operation {:?}",
            op
        ))),
    }
}

/// Converts a literal expression to a field.
fn literal(expr: &Expr) -> Option<Result<Field, SymqlError>> {
    let parse_int = |s: &str, negate: bool| {
        s.parse::<i64>()
            .map(|i| Field::IntField(if negate { -i } else { i }))
            .map_err(|_| SymqlError::ValidationError(format!("Unsupported literal {}", s)))
    };
    match expr {
        Expr::Value(Value::Number(s)) => Some(parse_int(s, false)),
        Expr::Value(Value::SingleQuotedString(s)) => Some(Ok(Field::TextField(s.clone()))),
        Expr::Value(Value::Boolean(b)) => Some(Ok(Field::from_bool(Some(*b)))),
        Expr::Value(Value::Null) => Some(Ok(Field::Null)),
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr,
        } => match &**expr {
            Expr::Value(Value::Number(s)) => Some(parse_int(s, true)),
            _ => None,
        },
        Expr::Nested(inner) => literal(inner),
        _ => None,
    }
}

impl<'a> Translator<'a> {
    /// Translates `query`.
    ///
    /// # Arguments
    ///
    /// * `query` - AST to translate.
    /// * `catalog` - Catalog for validation.
    pub fn from_sql(query: &Query, catalog: &Catalog) -> Result<ScanQuery, SymqlError> {
        let select = match &query.body {
            SetExpr::Select(select) => select,
            _ => {
                return Err(SymqlError::ValidationError(String::from(
                    "Only SELECT queries are supported",
                )))
            }
        };
        if !query.order_by.is_empty() {
            return Err(SymqlError::ValidationError(String::from(
                "Order by not supported",
            )));
        }
        let table = Self::table_name(select)?;
        let schema = catalog.get_table(&table)?.schema();
        let translator = Translator { schema, table };

        let limit = match &query.limit {
            Some(expr) => Some(translator.limit(expr)?),
            None => None,
        };
        let mut predicates = Vec::new();
        if let Some(expr) = &select.selection {
            translator.process_conjunction(expr, &mut predicates)?;
        }
        Ok(ScanQuery {
            columns: translator.process_projection(&select.projection)?,
            table: translator.table,
            predicates,
            limit,
        })
    }

    fn table_name(select: &Select) -> Result<String, SymqlError> {
        if select.distinct {
            return Err(SymqlError::ValidationError(String::from(
                "Distinct not supported",
            )));
        }
        if !select.group_by.is_empty() || select.having.is_some() {
            return Err(SymqlError::ValidationError(String::from(
                "Aggregation not supported",
            )));
        }
        let from = match select.from.as_slice() {
            [from] => from,
            [] => {
                return Err(SymqlError::ValidationError(String::from(
                    "A FROM clause is required",
                )))
            }
            _ => {
                return Err(SymqlError::ValidationError(String::from(
                    "Cross product not supported",
                )))
            }
        };
        if !from.joins.is_empty() {
            return Err(SymqlError::ValidationError(String::from(
                "Joins not supported",
            )));
        }
        match &from.relation {
            TableFactor::Table { name, .. } => get_name(name),
            _ => Err(SymqlError::ValidationError(String::from(
                "Nested joins and derived tables not supported",
            ))),
        }
    }

    fn limit(&self, expr: &Expr) -> Result<usize, SymqlError> {
        match literal(expr) {
            Some(Ok(Field::IntField(n))) if n >= 0 => Ok(n as usize),
            _ => Err(SymqlError::ValidationError(String::from(
                "LIMIT must be a non-negative integer",
            ))),
        }
    }

    /// Resolves a column reference to its index.
    fn column(&self, expr: &Expr) -> Result<Option<(usize, String)>, SymqlError> {
        let name = match expr {
            Expr::Identifier(name) => name,
            Expr::CompoundIdentifier(names) => match names.as_slice() {
                [table, name] if table.eq_ignore_ascii_case(&self.table) => name,
                _ => {
                    return Err(SymqlError::ValidationError(format!(
                        "The field {} is not present in tables listed in the query",
                        names.join(".")
                    )))
                }
            },
            Expr::Nested(inner) => return self.column(inner),
            _ => return Ok(None),
        };
        match self.schema.get_field_index(name) {
            Some(i) => Ok(Some((*i, self.schema.get_attribute(*i).map_or_else(
                || name.clone(),
                |a| a.name().to_string(),
            )))),
            None => Err(SymqlError::ValidationError(format!(
                "The field {} is not present in tables listed in the query",
                name
            ))),
        }
    }

    fn process_projection(&self, items: &[SelectItem]) -> Result<Vec<(usize, String)>, SymqlError> {
        let mut columns = Vec::new();
        for item in items {
            match item {
                SelectItem::Wildcard | SelectItem::QualifiedWildcard(_) => {
                    columns.extend(
                        self.schema
                            .attributes()
                            .enumerate()
                            .map(|(i, a)| (i, a.name().to_string())),
                    );
                }
                SelectItem::UnnamedExpr(expr) => columns.push(self.projected_column(expr)?),
                SelectItem::ExprWithAlias { expr, alias } => {
                    let (i, _) = self.projected_column(expr)?;
                    columns.push((i, alias.clone()));
                }
            }
        }
        Ok(columns)
    }

    fn projected_column(&self, expr: &Expr) -> Result<(usize, String), SymqlError> {
        self.column(expr)?.ok_or_else(|| {
            SymqlError::ValidationError(String::from("Select unsupported expression"))
        })
    }

    /// Flattens `a AND b AND ...` into predicates.
    fn process_conjunction(
        &self,
        expr: &Expr,
        out: &mut Vec<Predicate>,
    ) -> Result<(), SymqlError> {
        match expr {
            Expr::BinaryOp {
                left,
                op: BinaryOperator::And,
                right,
            } => {
                self.process_conjunction(left, out)?;
                self.process_conjunction(right, out)
            }
            Expr::Nested(inner) => self.process_conjunction(inner, out),
            Expr::BinaryOp { left, op, right } => {
                out.push(self.process_binary_op(left, op, right)?);
                Ok(())
            }
            _ => Err(SymqlError::ValidationError(String::from(
                "Only conjunctions of column comparisons are supported",
            ))),
        }
    }

    fn process_binary_op(
        &self,
        left: &Expr,
        op: &BinaryOperator,
        right: &Expr,
    ) -> Result<Predicate, SymqlError> {
        let op = binary_operator_to_constraint(op)?;
        let (column, op, value) = match (self.column(left)?, literal(right)) {
            (Some((column, _)), Some(value)) => (column, op, value?),
            _ => match (literal(left), self.column(right)?) {
                (Some(value), Some((column, _))) => (column, flip(op)?, value?),
                _ => {
                    return Err(SymqlError::ValidationError(String::from(
                        "Only where predicates with one identifier and one literal are supported",
                    )))
                }
            },
        };
        Ok(Predicate { column, op, value })
    }
}
