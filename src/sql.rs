use chrono::NaiveDate;
use sqlparser::ast::{
    self, AssignmentTarget, BinaryOperator, Expr, FromTable, ObjectNamePart, SetExpr, Statement, TableFactor,
    TableObject, TableWithJoins, Value, ValueWithSpan,
};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use ulid::Ulid;

use crate::model::*;
use crate::store::{RecurringFilter, ReservationFilter};

/// Parsed command from SQL input.
#[derive(Debug, PartialEq)]
pub enum Command {
    SelectSlots {
        date: NaiveDate,
    },
    SelectOccupancy {
        date: NaiveDate,
    },
    SelectPrice {
        hour: Hour,
        day: DayOfWeek,
    },
    SelectQuote {
        date: NaiveDate,
        span: HourSpan,
    },
    SelectTimeBands,
    SelectReservations {
        filter: ReservationFilter,
    },
    SelectRecurring {
        filter: RecurringFilter,
    },
    SelectRevenue {
        window: RevenueWindow,
    },
    SelectMonthTotal {
        date: NaiveDate,
    },
    SelectDaySummary {
        date: NaiveDate,
    },
    SelectOperatingHours,
    InsertReservation {
        id: Ulid,
        date: NaiveDate,
        span: HourSpan,
        status: ReservationStatus,
        kind: Option<String>,
        /// `None` asks for the price-table quote.
        price: Option<Amount>,
        client_name: Option<String>,
        client_phone: Option<String>,
        payment_method: Option<String>,
    },
    UpdateReservation {
        id: Ulid,
        status: ReservationStatus,
    },
    DeleteReservation {
        id: Ulid,
    },
    InsertRecurring {
        booking: RecurringBooking,
    },
    UpdateRecurring {
        id: Ulid,
        status: RecurringStatus,
    },
    InsertTimeBand {
        band: TimeBand,
    },
    UpdateTimeBand {
        id: Ulid,
        active: bool,
    },
    InsertProductSale {
        sale: ProductSale,
    },
    UpsertOperatingHours {
        day: DayOfWeek,
        hours: OperatingHours,
    },
}

/// Which dates `SELECT * FROM revenue` covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevenueWindow {
    Since(NaiveDate),
    /// The last N days ending today.
    LastDays(u32),
}

pub fn parse_sql(sql: &str) -> Result<Command, SqlError> {
    let mut commands = parse_batch(sql)?;
    Ok(commands.swap_remove(0))
}

/// Every `;`-separated statement in `sql`, in order.
pub fn parse_batch(sql: &str) -> Result<Vec<Command>, SqlError> {
    let dialect = PostgreSqlDialect {};
    let stmts = Parser::parse_sql(&dialect, sql).map_err(|e| SqlError::Parse(e.to_string()))?;
    if stmts.is_empty() {
        return Err(SqlError::Empty);
    }
    stmts.iter().map(parse_statement).collect()
}

fn parse_statement(stmt: &Statement) -> Result<Command, SqlError> {
    match stmt {
        Statement::Insert(insert) => parse_insert(insert),
        Statement::Delete(delete) => parse_delete(delete),
        Statement::Update {
            table,
            assignments,
            selection,
            ..
        } => parse_update(table, assignments, selection),
        Statement::Query(query) => parse_select(query),
        other => Err(SqlError::Unsupported(format!("{other}"))),
    }
}

fn parse_insert(insert: &ast::Insert) -> Result<Command, SqlError> {
    let table = insert_table_name(insert)?;
    let values = extract_insert_values(insert)?;

    match table.as_str() {
        "reservations" => {
            if values.len() < 4 {
                return Err(SqlError::WrongArity("reservations", 4, values.len()));
            }
            let status = match values.get(4) {
                Some(expr) => parse_text_or_null(expr)?
                    .map(|s| s.parse::<ReservationStatus>())
                    .transpose()
                    .map_err(model_err)?
                    .unwrap_or(ReservationStatus::Pending),
                None => ReservationStatus::Pending,
            };
            Ok(Command::InsertReservation {
                id: parse_ulid(&values[0])?,
                date: parse_date_expr(&values[1])?,
                span: parse_span(&values[2], &values[3])?,
                status,
                kind: optional(&values, 5, parse_text_or_null)?,
                price: optional(&values, 6, parse_i64_or_null)?,
                client_name: optional(&values, 7, parse_text_or_null)?,
                client_phone: optional(&values, 8, parse_text_or_null)?,
                payment_method: optional(&values, 9, parse_text_or_null)?,
            })
        }
        "recurring_bookings" => {
            if values.len() < 4 {
                return Err(SqlError::WrongArity("recurring_bookings", 4, values.len()));
            }
            let mut booking = RecurringBooking::new(
                parse_ulid(&values[0])?,
                parse_day_expr(&values[1])?,
                parse_span(&values[2], &values[3])?,
            );
            if let Some(status) = optional(&values, 4, parse_text_or_null)? {
                booking = booking.with_status(status.parse().map_err(model_err)?);
            }
            let party_size = match values.get(7) {
                Some(expr) => parse_i64_or_null(expr)?.map(to_u32).transpose()?,
                None => None,
            };
            Ok(Command::InsertRecurring {
                booking: booking.with_client(
                    optional(&values, 5, parse_text_or_null)?,
                    optional(&values, 6, parse_text_or_null)?,
                    party_size,
                ),
            })
        }
        "time_bands" => {
            if values.len() < 6 {
                return Err(SqlError::WrongArity("time_bands", 6, values.len()));
            }
            let prices = BandPrices {
                weekday: parse_i64(&values[3])?,
                friday: parse_i64(&values[4])?,
                weekend_holiday: parse_i64(&values[5])?,
            };
            let span = parse_span(&values[1], &values[2])?;
            let label = optional(&values, 6, parse_text_or_null)?.unwrap_or_else(|| span.to_string());
            let active = match values.get(7) {
                Some(expr) => parse_bool(expr)?,
                None => true,
            };
            let band = TimeBand::new(parse_ulid(&values[0])?, span, prices, label, active).map_err(model_err)?;
            Ok(Command::InsertTimeBand { band })
        }
        "product_sales" => {
            if values.len() < 5 {
                return Err(SqlError::WrongArity("product_sales", 5, values.len()));
            }
            let sale = ProductSale::new(
                parse_ulid(&values[0])?,
                parse_date_expr(&values[1])?,
                parse_ulid_or_null(&values[2])?,
                parse_u32(&values[3])?,
                parse_i64(&values[4])?,
            )
            .map_err(model_err)?;
            Ok(Command::InsertProductSale { sale })
        }
        "operating_hours" => {
            if values.len() < 3 {
                return Err(SqlError::WrongArity("operating_hours", 3, values.len()));
            }
            let hours =
                OperatingHours::new(parse_hour_expr(&values[1])?, parse_hour_expr(&values[2])?).map_err(model_err)?;
            Ok(Command::UpsertOperatingHours {
                day: parse_day_expr(&values[0])?,
                hours,
            })
        }
        _ => Err(SqlError::UnknownTable(table)),
    }
}

fn parse_delete(delete: &ast::Delete) -> Result<Command, SqlError> {
    let table = delete_table_name(delete)?;
    let id = extract_where_id(&delete.selection)?;

    match table.as_str() {
        "reservations" => Ok(Command::DeleteReservation { id }),
        _ => Err(SqlError::UnknownTable(table)),
    }
}

fn parse_update(
    table: &TableWithJoins,
    assignments: &[ast::Assignment],
    selection: &Option<Expr>,
) -> Result<Command, SqlError> {
    let table = table_factor_name(&table.relation)?;
    let id = extract_where_id(selection)?;
    let assigned = |column: &'static str| -> Result<&Expr, SqlError> {
        assignments
            .iter()
            .find(|a| match &a.target {
                AssignmentTarget::ColumnName(name) => object_name_last(name).as_deref() == Some(column),
                _ => false,
            })
            .map(|a| &a.value)
            .ok_or(SqlError::MissingFilter(column))
    };

    match table.as_str() {
        "reservations" => {
            let status = parse_text(assigned("status")?)?.parse().map_err(model_err)?;
            Ok(Command::UpdateReservation { id, status })
        }
        "recurring_bookings" => {
            let status = parse_text(assigned("status")?)?.parse().map_err(model_err)?;
            Ok(Command::UpdateRecurring { id, status })
        }
        "time_bands" => Ok(Command::UpdateTimeBand {
            id,
            active: parse_bool(assigned("active")?)?,
        }),
        _ => Err(SqlError::UnknownTable(table)),
    }
}

fn parse_select(query: &ast::Query) -> Result<Command, SqlError> {
    let select = match query.body.as_ref() {
        SetExpr::Select(s) => s,
        _ => return Err(SqlError::Unsupported("non-SELECT query".into())),
    };

    if select.from.is_empty() {
        return Err(SqlError::Parse("SELECT without FROM".into()));
    }
    let table = table_factor_name(&select.from[0].relation)?;

    let mut filters = Vec::new();
    if let Some(selection) = &select.selection {
        collect_filters(selection, &mut filters)?;
    }
    let required_date = || -> Result<NaiveDate, SqlError> {
        parse_date_expr(find_filter(&filters, "date", BinaryOperator::Eq).ok_or(SqlError::MissingFilter("date"))?)
    };

    match table.as_str() {
        "slots" => Ok(Command::SelectSlots { date: required_date()? }),
        "occupancy" => Ok(Command::SelectOccupancy { date: required_date()? }),
        "month_total" => Ok(Command::SelectMonthTotal { date: required_date()? }),
        "day_summary" => Ok(Command::SelectDaySummary { date: required_date()? }),
        "prices" => {
            let hour = find_filter(&filters, "hour", BinaryOperator::Eq).ok_or(SqlError::MissingFilter("hour"))?;
            let day = find_filter(&filters, "dow", BinaryOperator::Eq)
                .or_else(|| find_filter(&filters, "day_of_week", BinaryOperator::Eq))
                .ok_or(SqlError::MissingFilter("dow"))?;
            Ok(Command::SelectPrice {
                hour: parse_hour_expr(hour)?,
                day: parse_day_expr(day)?,
            })
        }
        "quote" => {
            let start =
                find_filter(&filters, "start_hour", BinaryOperator::Eq).ok_or(SqlError::MissingFilter("start_hour"))?;
            let end = find_filter(&filters, "end_hour", BinaryOperator::Eq).ok_or(SqlError::MissingFilter("end_hour"))?;
            Ok(Command::SelectQuote {
                date: required_date()?,
                span: parse_span(start, end)?,
            })
        }
        "time_bands" => Ok(Command::SelectTimeBands),
        "operating_hours" => Ok(Command::SelectOperatingHours),
        "reservations" => {
            let mut filter = ReservationFilter::default();
            if let Some(expr) = find_filter(&filters, "date", BinaryOperator::Eq) {
                filter.date = Some(parse_date_expr(expr)?);
            }
            if let Some(expr) = find_filter(&filters, "status", BinaryOperator::Eq) {
                filter.status = Some(parse_text(expr)?.parse().map_err(model_err)?);
            }
            if let Some(expr) = find_filter(&filters, "status", BinaryOperator::NotEq) {
                let excluded: ReservationStatus = parse_text(expr)?.parse().map_err(model_err)?;
                if excluded != ReservationStatus::Cancelled {
                    return Err(SqlError::Unsupported("status <> only supports 'cancelled'".into()));
                }
                filter.exclude_cancelled = true;
            }
            if let Some(expr) = find_filter(&filters, "kind", BinaryOperator::Eq) {
                filter.kind = Some(parse_text(expr)?);
            }
            Ok(Command::SelectReservations { filter })
        }
        "recurring_bookings" => {
            let mut filter = RecurringFilter::default();
            if let Some(expr) = find_filter(&filters, "day_of_week", BinaryOperator::Eq) {
                filter.day = Some(parse_day_expr(expr)?);
            }
            if let Some(expr) = find_filter(&filters, "status", BinaryOperator::Eq) {
                filter.status = Some(parse_text(expr)?.parse().map_err(model_err)?);
            }
            Ok(Command::SelectRecurring { filter })
        }
        "revenue" => {
            let window = if let Some(expr) = find_filter(&filters, "date", BinaryOperator::GtEq) {
                RevenueWindow::Since(parse_date_expr(expr)?)
            } else if let Some(expr) = find_filter(&filters, "days", BinaryOperator::Eq) {
                RevenueWindow::LastDays(parse_u32(expr)?)
            } else {
                return Err(SqlError::MissingFilter("date"));
            };
            Ok(Command::SelectRevenue { window })
        }
        _ => Err(SqlError::UnknownTable(table)),
    }
}

/// One `column <op> value` term of a WHERE clause.
struct Filter<'a> {
    column: String,
    op: BinaryOperator,
    value: &'a Expr,
}

/// Flatten an AND-chain of comparisons. Anything else is rejected.
fn collect_filters<'a>(expr: &'a Expr, out: &mut Vec<Filter<'a>>) -> Result<(), SqlError> {
    match expr {
        Expr::Nested(inner) => collect_filters(inner, out),
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => {
            collect_filters(left, out)?;
            collect_filters(right, out)
        }
        Expr::BinaryOp { left, op, right } => {
            let column = expr_column_name(left).ok_or_else(|| SqlError::Unsupported(format!("{expr}")))?;
            out.push(Filter {
                column,
                op: op.clone(),
                value: right,
            });
            Ok(())
        }
        other => Err(SqlError::Unsupported(format!("{other}"))),
    }
}

fn find_filter<'a>(filters: &[Filter<'a>], column: &str, op: BinaryOperator) -> Option<&'a Expr> {
    filters
        .iter()
        .find(|f| f.column == column && f.op == op)
        .map(|f| f.value)
}

// ── Helpers ───────────────────────────────────────────────────

fn object_name_last(name: &ast::ObjectName) -> Option<String> {
    name.0.last().and_then(|part| match part {
        ObjectNamePart::Identifier(ident) => Some(ident.value.to_lowercase()),
        _ => None,
    })
}

fn insert_table_name(insert: &ast::Insert) -> Result<String, SqlError> {
    match &insert.table {
        TableObject::TableName(name) => {
            object_name_last(name).ok_or_else(|| SqlError::Parse("empty table name".into()))
        }
        _ => Err(SqlError::Parse("unsupported table object in INSERT".into())),
    }
}

fn delete_table_name(delete: &ast::Delete) -> Result<String, SqlError> {
    let tables_with_joins = match &delete.from {
        FromTable::WithFromKeyword(t) | FromTable::WithoutKeyword(t) => t,
    };
    if let Some(first) = tables_with_joins.first() {
        table_factor_name(&first.relation)
    } else {
        Err(SqlError::Parse("DELETE without table".into()))
    }
}

fn table_factor_name(tf: &TableFactor) -> Result<String, SqlError> {
    match tf {
        TableFactor::Table { name, .. } => {
            object_name_last(name).ok_or_else(|| SqlError::Parse("empty table name".into()))
        }
        _ => Err(SqlError::Parse("complex table expression".into())),
    }
}

fn extract_insert_values(insert: &ast::Insert) -> Result<Vec<Expr>, SqlError> {
    let body = insert
        .source
        .as_ref()
        .ok_or(SqlError::Parse("no VALUES".into()))?;
    match body.body.as_ref() {
        SetExpr::Values(values) => match values.rows.as_slice() {
            [] => Err(SqlError::Parse("empty VALUES".into())),
            [row] => Ok(row.clone()),
            _ => Err(SqlError::Unsupported("multi-row INSERT".into())),
        },
        _ => Err(SqlError::Parse("expected VALUES".into())),
    }
}

fn extract_where_id(selection: &Option<Expr>) -> Result<Ulid, SqlError> {
    let sel = selection.as_ref().ok_or(SqlError::MissingFilter("id"))?;
    match sel {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Eq,
            right,
        } => {
            if expr_column_name(left).as_deref() == Some("id") {
                parse_ulid(right)
            } else {
                Err(SqlError::MissingFilter("id"))
            }
        }
        _ => Err(SqlError::MissingFilter("id")),
    }
}

fn expr_column_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.to_lowercase()),
        Expr::CompoundIdentifier(parts) => parts.last().map(|i| i.value.to_lowercase()),
        _ => None,
    }
}

fn extract_value(expr: &Expr) -> Option<&Value> {
    match expr {
        Expr::Value(ValueWithSpan { value, .. }) => Some(value),
        _ => None,
    }
}

fn is_null(expr: &Expr) -> bool {
    matches!(extract_value(expr), Some(Value::Null))
}

/// Parse column `index` if present; absent columns read as NULL.
fn optional<T>(
    values: &[Expr],
    index: usize,
    parse: fn(&Expr) -> Result<Option<T>, SqlError>,
) -> Result<Option<T>, SqlError> {
    match values.get(index) {
        Some(expr) => parse(expr),
        None => Ok(None),
    }
}

fn parse_ulid(expr: &Expr) -> Result<Ulid, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::SingleQuotedString(s) | Value::Number(s, _) => {
                Ulid::from_string(s).map_err(|e| SqlError::Parse(format!("bad ULID: {e}")))
            }
            _ => Err(SqlError::Parse(format!("expected string, got {value:?}"))),
        }
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

fn parse_ulid_or_null(expr: &Expr) -> Result<Option<Ulid>, SqlError> {
    if is_null(expr) {
        Ok(None)
    } else {
        parse_ulid(expr).map(Some)
    }
}

fn parse_text(expr: &Expr) -> Result<String, SqlError> {
    match extract_value(expr) {
        Some(Value::SingleQuotedString(s)) => Ok(s.clone()),
        Some(value) => Err(SqlError::Parse(format!("expected string, got {value:?}"))),
        None => Err(SqlError::Parse(format!("expected value, got {expr:?}"))),
    }
}

fn parse_text_or_null(expr: &Expr) -> Result<Option<String>, SqlError> {
    if is_null(expr) {
        Ok(None)
    } else {
        parse_text(expr).map(Some)
    }
}

fn parse_i64(expr: &Expr) -> Result<i64, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::Number(s, _) => s
                .parse()
                .map_err(|e| SqlError::Parse(format!("bad i64: {e}"))),
            Value::SingleQuotedString(s) => s
                .parse()
                .map_err(|e| SqlError::Parse(format!("bad i64: {e}"))),
            _ => Err(SqlError::Parse(format!("expected number, got {value:?}"))),
        }
    } else if let Expr::UnaryOp {
        op: ast::UnaryOperator::Minus,
        expr,
    } = expr
    {
        Ok(-parse_i64(expr)?)
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

fn parse_i64_or_null(expr: &Expr) -> Result<Option<i64>, SqlError> {
    if is_null(expr) {
        Ok(None)
    } else {
        parse_i64(expr).map(Some)
    }
}

fn to_u32(v: i64) -> Result<u32, SqlError> {
    u32::try_from(v).map_err(|_| SqlError::Parse(format!("{v} out of u32 range")))
}

fn parse_u32(expr: &Expr) -> Result<u32, SqlError> {
    to_u32(parse_i64(expr)?)
}

fn parse_bool(expr: &Expr) -> Result<bool, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::Boolean(b) => Ok(*b),
            Value::SingleQuotedString(s) => match s.to_lowercase().as_str() {
                "true" | "t" | "1" => Ok(true),
                "false" | "f" | "0" => Ok(false),
                _ => Err(SqlError::Parse(format!("bad bool: {s}"))),
            },
            Value::Number(n, _) => Ok(n != "0"),
            _ => Err(SqlError::Parse(format!("expected bool, got {value:?}"))),
        }
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

fn parse_date_expr(expr: &Expr) -> Result<NaiveDate, SqlError> {
    parse_date(&parse_text(expr)?).map_err(model_err)
}

/// `18` or `'18:00'`.
fn parse_hour_expr(expr: &Expr) -> Result<Hour, SqlError> {
    match extract_value(expr) {
        Some(Value::SingleQuotedString(s)) => parse_hour(s).map_err(model_err),
        Some(Value::Number(s, _)) => parse_hour(s).map_err(model_err),
        _ => Err(SqlError::Parse(format!("expected hour, got {expr:?}"))),
    }
}

fn parse_span(start: &Expr, end: &Expr) -> Result<HourSpan, SqlError> {
    HourSpan::new(parse_hour_expr(start)?, parse_hour_expr(end)?).map_err(model_err)
}

/// 0 = Sunday .. 6 = Saturday.
fn parse_day_expr(expr: &Expr) -> Result<DayOfWeek, SqlError> {
    let n = parse_i64(expr)?;
    let n = u8::try_from(n).map_err(|_| SqlError::Parse(format!("bad day of week: {n}")))?;
    DayOfWeek::new(n).map_err(model_err)
}

fn model_err(e: ModelError) -> SqlError {
    SqlError::Parse(e.to_string())
}

// ── Errors ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum SqlError {
    Parse(String),
    Empty,
    Unsupported(String),
    UnknownTable(String),
    WrongArity(&'static str, usize, usize),
    MissingFilter(&'static str),
}

impl std::fmt::Display for SqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlError::Parse(s) => write!(f, "parse error: {s}"),
            SqlError::Empty => write!(f, "empty query"),
            SqlError::Unsupported(s) => write!(f, "unsupported: {s}"),
            SqlError::UnknownTable(t) => write!(f, "unknown table: {t}"),
            SqlError::WrongArity(t, expected, got) => {
                write!(f, "{t}: expected at least {expected} values, got {got}")
            }
            SqlError::MissingFilter(col) => write!(f, "missing filter: {col}"),
        }
    }
}

impl std::error::Error for SqlError {}
