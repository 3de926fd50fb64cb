use std::fmt::Debug;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::stream;
use futures::Sink;
use pgwire::api::auth::StartupHandler;
use pgwire::api::copy::CopyHandler;
use pgwire::api::portal::{Format, Portal};
use pgwire::api::query::{ExtendedQueryHandler, SimpleQueryHandler};
use pgwire::api::results::{
    DataRowEncoder, DescribePortalResponse, DescribeStatementResponse, FieldFormat, FieldInfo,
    QueryResponse, Response, Tag,
};
use pgwire::api::stmt::{QueryParser, StoredStatement};
use pgwire::api::store::PortalStore;
use pgwire::api::{ClientInfo, ClientPortalStore, NoopHandler, PgWireServerHandlers, Type};
use pgwire::error::{ErrorInfo, PgWireError, PgWireResult};
use pgwire::messages::PgWireBackendMessage;
use tokio::net::TcpStream;
use tracing::debug;

use crate::engine::{self, EngineError, FinanceAggregator, PriceTable};
use crate::model::*;
use crate::observability;
use crate::sql::{self, Command, RevenueWindow};
use crate::store::{CourtStore, StoreError};
use crate::tenant::{Venue, VenueManager};

pub struct CanchaHandler {
    venue_manager: Arc<VenueManager>,
    query_parser: Arc<CanchaQueryParser>,
}

impl CanchaHandler {
    pub fn new(venue_manager: Arc<VenueManager>) -> Self {
        Self {
            venue_manager,
            query_parser: Arc::new(CanchaQueryParser),
        }
    }

    async fn resolve_venue<C: ClientInfo>(&self, client: &C) -> PgWireResult<Arc<Venue>> {
        let db = client
            .metadata()
            .get("database")
            .cloned()
            .unwrap_or_else(|| "default".to_string());
        self.venue_manager.get_or_create(&db).await.map_err(|e| {
            PgWireError::UserError(Box::new(ErrorInfo::new(
                "ERROR".into(),
                "08006".into(),
                format!("venue error: {e}"),
            )))
        })
    }

    /// Run every statement in `sql`, recording metrics per statement.
    /// Stops at the first failure.
    async fn run(&self, venue: &Venue, sql: &str) -> PgWireResult<Vec<Response>> {
        let commands = sql::parse_batch(sql).map_err(sql_err)?;
        let mut responses = Vec::with_capacity(commands.len());
        for cmd in commands {
            let label = observability::command_label(&cmd);
            let started = Instant::now();
            let result = self.execute_command(venue, cmd).await;
            let status = if result.is_ok() { "ok" } else { "error" };
            metrics::counter!(observability::QUERIES_TOTAL, "command" => label, "status" => status).increment(1);
            metrics::histogram!(observability::QUERY_DURATION_SECONDS, "command" => label)
                .record(started.elapsed().as_secs_f64());
            responses.extend(result?);
        }
        Ok(responses)
    }

    async fn execute_command(&self, venue: &Venue, cmd: Command) -> PgWireResult<Vec<Response>> {
        let store = &venue.store;
        match cmd {
            // ── Reads ───────────────────────────────────────────
            Command::SelectSlots { date } => {
                let grid = engine::plan_day(store, date, venue.default_hours)
                    .await
                    .map_err(engine_err)?;
                Ok(vec![rows(slots_schema(), grid, |enc, slot| {
                    enc.encode_field(&slot.date.to_string())?;
                    enc.encode_field(&i32::from(slot.hour))?;
                    enc.encode_field(&slot.price)?;
                    enc.encode_field(&slot.tier.to_string())?;
                    enc.encode_field(&slot.label)?;
                    enc.encode_field(&slot.is_occupied())?;
                    enc.encode_field(&slot.occupied_by.map(|o| o.source().to_string()))?;
                    enc.encode_field(&slot.occupied_by.map(|o| o.id().to_string()))
                })])
            }
            Command::SelectOccupancy { date } => {
                let occupancy = engine::AvailabilityResolver::new(store)
                    .occupied_slots(date)
                    .await
                    .map_err(engine_err)?;
                let mut claims: Vec<(&'static str, String, HourSpan, String)> = occupancy
                    .reservations
                    .iter()
                    .map(|r| ("reservation", r.id.to_string(), r.span, r.status.to_string()))
                    .collect();
                claims.extend(
                    occupancy
                        .recurring
                        .iter()
                        .map(|b| ("fixed_client", b.id.to_string(), b.span, b.status.to_string())),
                );
                Ok(vec![rows(occupancy_schema(), claims, |enc, (source, id, span, status)| {
                    enc.encode_field(&source.to_string())?;
                    enc.encode_field(&id)?;
                    enc.encode_field(&date.to_string())?;
                    enc.encode_field(&i32::from(span.start))?;
                    enc.encode_field(&i32::from(span.end))?;
                    enc.encode_field(&status)
                })])
            }
            Command::SelectPrice { hour, day } => {
                let prices = PriceTable::load(store).await.map_err(engine_err)?;
                let quote = prices.price_for(hour, day);
                Ok(vec![rows(prices_schema(), vec![quote], |enc, q| {
                    enc.encode_field(&i32::from(hour))?;
                    enc.encode_field(&i32::from(day.number()))?;
                    enc.encode_field(&q.price)?;
                    enc.encode_field(&q.tier.to_string())?;
                    enc.encode_field(&q.label)
                })])
            }
            Command::SelectQuote { date, span } => {
                let prices = PriceTable::load(store).await.map_err(engine_err)?;
                let total = engine::quote(&prices, date, span).map_err(engine_err)?;
                Ok(vec![rows(quote_schema(), vec![total], |enc, total| {
                    enc.encode_field(&date.to_string())?;
                    enc.encode_field(&i32::from(span.start))?;
                    enc.encode_field(&i32::from(span.end))?;
                    enc.encode_field(&total)
                })])
            }
            Command::SelectTimeBands => Ok(vec![rows(time_bands_schema(), store.all_time_bands(), |enc, b| {
                enc.encode_field(&b.id.to_string())?;
                enc.encode_field(&i32::from(b.span.start))?;
                enc.encode_field(&i32::from(b.span.end))?;
                enc.encode_field(&b.prices.weekday)?;
                enc.encode_field(&b.prices.friday)?;
                enc.encode_field(&b.prices.weekend_holiday)?;
                enc.encode_field(&b.label)?;
                enc.encode_field(&b.active)?;
                enc.encode_field(&b.tier().to_string())
            })]),
            Command::SelectReservations { filter } => {
                let found = store.fetch_reservations(&filter).await.map_err(fetch_err)?;
                Ok(vec![rows(reservations_schema(), found, |enc, r| {
                    enc.encode_field(&r.id.to_string())?;
                    enc.encode_field(&r.date.to_string())?;
                    enc.encode_field(&i32::from(r.span.start))?;
                    enc.encode_field(&i32::from(r.span.end))?;
                    enc.encode_field(&r.status.to_string())?;
                    enc.encode_field(&r.kind)?;
                    enc.encode_field(&r.price)?;
                    enc.encode_field(&r.client_name)?;
                    enc.encode_field(&r.client_phone)?;
                    enc.encode_field(&r.payment_method)
                })])
            }
            Command::SelectRecurring { filter } => {
                let found = store.fetch_recurring_bookings(&filter).await.map_err(fetch_err)?;
                Ok(vec![rows(recurring_schema(), found, |enc, b| {
                    enc.encode_field(&b.id.to_string())?;
                    enc.encode_field(&i32::from(b.day.number()))?;
                    enc.encode_field(&i32::from(b.span.start))?;
                    enc.encode_field(&i32::from(b.span.end))?;
                    enc.encode_field(&b.status.to_string())?;
                    enc.encode_field(&b.client_name)?;
                    enc.encode_field(&b.client_phone)?;
                    enc.encode_field(&b.party_size.map(i64::from))
                })])
            }
            Command::SelectRevenue { window } => {
                let finance = FinanceAggregator::new(store);
                let by_date = match window {
                    RevenueWindow::Since(since) => finance.revenue_by_date(since).await,
                    RevenueWindow::LastDays(days) => {
                        let today = chrono::Local::now().date_naive();
                        finance.revenue_last_days(today, days).await
                    }
                }
                .map_err(engine_err)?;
                Ok(vec![rows(revenue_schema(), by_date.into_iter().collect::<Vec<_>>(), |enc, (date, amount)| {
                    enc.encode_field(&date.to_string())?;
                    enc.encode_field(&amount)
                })])
            }
            Command::SelectMonthTotal { date } => {
                let total = FinanceAggregator::new(store).month_total(date).await.map_err(engine_err)?;
                Ok(vec![rows(month_total_schema(), vec![total], |enc, t| {
                    enc.encode_field(&t.court_revenue)?;
                    enc.encode_field(&t.shop_revenue)?;
                    enc.encode_field(&t.total)
                })])
            }
            Command::SelectDaySummary { date } => {
                let summary = FinanceAggregator::new(store).day_summary(date).await.map_err(engine_err)?;
                Ok(vec![rows(day_summary_schema(), vec![summary], |enc, s| {
                    enc.encode_field(&date.to_string())?;
                    enc.encode_field(&i64::from(s.pending))?;
                    enc.encode_field(&i64::from(s.confirmed))?;
                    enc.encode_field(&i64::from(s.occupied_hours))?;
                    enc.encode_field(&s.revenue)
                })])
            }
            Command::SelectOperatingHours => {
                let mut week = Vec::with_capacity(7);
                for n in 0..7 {
                    let day = DayOfWeek::new(n).map_err(model_err)?;
                    let hours = engine::operating_hours_for(store, day, venue.default_hours)
                        .await
                        .map_err(engine_err)?;
                    week.push((day, hours));
                }
                Ok(vec![rows(operating_hours_schema(), week, |enc, (day, hours)| {
                    enc.encode_field(&i32::from(day.number()))?;
                    enc.encode_field(&i32::from(hours.start))?;
                    enc.encode_field(&i32::from(hours.end))
                })])
            }

            // ── Writes ──────────────────────────────────────────
            Command::InsertReservation {
                id,
                date,
                span,
                status,
                kind,
                price,
                client_name,
                client_phone,
                payment_method,
            } => {
                let price = match price {
                    Some(p) => p,
                    None => {
                        let prices = PriceTable::load(store).await.map_err(engine_err)?;
                        engine::quote(&prices, date, span).map_err(engine_err)?
                    }
                };
                let reservation = Reservation::new(id, date, span, price)
                    .map_err(model_err)?
                    .with_status(status)
                    .with_kind(kind.unwrap_or_else(|| DEFAULT_RESERVATION_KIND.to_string()))
                    .with_client(client_name, client_phone)
                    .with_payment_method(payment_method);
                store.create_reservation(reservation).await.map_err(store_err)?;
                Ok(vec![Response::Execution(Tag::new("INSERT").with_rows(1))])
            }
            Command::UpdateReservation { id, status } => {
                store.set_reservation_status(id, status).await.map_err(store_err)?;
                Ok(vec![Response::Execution(Tag::new("UPDATE").with_rows(1))])
            }
            Command::DeleteReservation { id } => {
                store.delete_reservation(id).await.map_err(store_err)?;
                Ok(vec![Response::Execution(Tag::new("DELETE").with_rows(1))])
            }
            Command::InsertRecurring { booking } => {
                store.create_recurring(booking).await.map_err(store_err)?;
                Ok(vec![Response::Execution(Tag::new("INSERT").with_rows(1))])
            }
            Command::UpdateRecurring { id, status } => {
                store.set_recurring_status(id, status).await.map_err(store_err)?;
                Ok(vec![Response::Execution(Tag::new("UPDATE").with_rows(1))])
            }
            Command::InsertTimeBand { band } => {
                store.upsert_time_band(band).await.map_err(store_err)?;
                Ok(vec![Response::Execution(Tag::new("INSERT").with_rows(1))])
            }
            Command::UpdateTimeBand { id, active } => {
                store.set_time_band_active(id, active).await.map_err(store_err)?;
                Ok(vec![Response::Execution(Tag::new("UPDATE").with_rows(1))])
            }
            Command::InsertProductSale { sale } => {
                store.record_product_sale(sale).await.map_err(store_err)?;
                Ok(vec![Response::Execution(Tag::new("INSERT").with_rows(1))])
            }
            Command::UpsertOperatingHours { day, hours } => {
                store.set_operating_hours(day, hours);
                Ok(vec![Response::Execution(Tag::new("INSERT").with_rows(1))])
            }
        }
    }
}

/// Encode `items` one row each against `schema`.
fn rows<T>(
    schema: Vec<FieldInfo>,
    items: Vec<T>,
    encode: impl Fn(&mut DataRowEncoder, T) -> PgWireResult<()>,
) -> Response {
    let schema = Arc::new(schema);
    let rows: Vec<PgWireResult<_>> = items
        .into_iter()
        .map(|item| {
            let mut encoder = DataRowEncoder::new(schema.clone());
            encode(&mut encoder, item)?;
            Ok(encoder.take_row())
        })
        .collect();
    Response::Query(QueryResponse::new(schema, stream::iter(rows)))
}

// ── Result schemas ───────────────────────────────────────────────

fn field(name: &str, ty: Type) -> FieldInfo {
    FieldInfo::new(name.into(), None, None, ty, FieldFormat::Text)
}

fn slots_schema() -> Vec<FieldInfo> {
    vec![
        field("date", Type::VARCHAR),
        field("hour", Type::INT4),
        field("price", Type::INT8),
        field("tier", Type::VARCHAR),
        field("label", Type::VARCHAR),
        field("occupied", Type::BOOL),
        field("source", Type::VARCHAR),
        field("occupant_id", Type::VARCHAR),
    ]
}

fn occupancy_schema() -> Vec<FieldInfo> {
    vec![
        field("source", Type::VARCHAR),
        field("id", Type::VARCHAR),
        field("date", Type::VARCHAR),
        field("start_hour", Type::INT4),
        field("end_hour", Type::INT4),
        field("status", Type::VARCHAR),
    ]
}

fn prices_schema() -> Vec<FieldInfo> {
    vec![
        field("hour", Type::INT4),
        field("dow", Type::INT4),
        field("price", Type::INT8),
        field("tier", Type::VARCHAR),
        field("label", Type::VARCHAR),
    ]
}

fn quote_schema() -> Vec<FieldInfo> {
    vec![
        field("date", Type::VARCHAR),
        field("start_hour", Type::INT4),
        field("end_hour", Type::INT4),
        field("price", Type::INT8),
    ]
}

fn time_bands_schema() -> Vec<FieldInfo> {
    vec![
        field("id", Type::VARCHAR),
        field("start_hour", Type::INT4),
        field("end_hour", Type::INT4),
        field("price_weekday", Type::INT8),
        field("price_friday", Type::INT8),
        field("price_weekend", Type::INT8),
        field("label", Type::VARCHAR),
        field("active", Type::BOOL),
        field("tier", Type::VARCHAR),
    ]
}

fn reservations_schema() -> Vec<FieldInfo> {
    vec![
        field("id", Type::VARCHAR),
        field("date", Type::VARCHAR),
        field("start_hour", Type::INT4),
        field("end_hour", Type::INT4),
        field("status", Type::VARCHAR),
        field("kind", Type::VARCHAR),
        field("price", Type::INT8),
        field("client_name", Type::VARCHAR),
        field("client_phone", Type::VARCHAR),
        field("payment_method", Type::VARCHAR),
    ]
}

fn recurring_schema() -> Vec<FieldInfo> {
    vec![
        field("id", Type::VARCHAR),
        field("day_of_week", Type::INT4),
        field("start_hour", Type::INT4),
        field("end_hour", Type::INT4),
        field("status", Type::VARCHAR),
        field("client_name", Type::VARCHAR),
        field("client_phone", Type::VARCHAR),
        field("party_size", Type::INT8),
    ]
}

fn revenue_schema() -> Vec<FieldInfo> {
    vec![field("date", Type::VARCHAR), field("revenue", Type::INT8)]
}

fn month_total_schema() -> Vec<FieldInfo> {
    vec![
        field("court_revenue", Type::INT8),
        field("shop_revenue", Type::INT8),
        field("total", Type::INT8),
    ]
}

fn day_summary_schema() -> Vec<FieldInfo> {
    vec![
        field("date", Type::VARCHAR),
        field("pending", Type::INT8),
        field("confirmed", Type::INT8),
        field("occupied_hours", Type::INT8),
        field("revenue", Type::INT8),
    ]
}

fn operating_hours_schema() -> Vec<FieldInfo> {
    vec![
        field("day_of_week", Type::INT4),
        field("open_hour", Type::INT4),
        field("close_hour", Type::INT4),
    ]
}

/// Result columns of a SELECT, looked up by table name. Statements
/// that return no rows describe as empty.
fn result_schema(sql: &str) -> Vec<FieldInfo> {
    let mut tokens = sql.split_whitespace();
    if !tokens.next().is_some_and(|t| t.eq_ignore_ascii_case("SELECT")) {
        return vec![];
    }
    let table = tokens
        .skip_while(|t| !t.eq_ignore_ascii_case("FROM"))
        .nth(1)
        .map(|t| t.trim_end_matches(';').trim_matches('"').to_lowercase());
    match table.as_deref() {
        Some("slots") => slots_schema(),
        Some("occupancy") => occupancy_schema(),
        Some("prices") => prices_schema(),
        Some("quote") => quote_schema(),
        Some("time_bands") => time_bands_schema(),
        Some("reservations") => reservations_schema(),
        Some("recurring_bookings") => recurring_schema(),
        Some("revenue") => revenue_schema(),
        Some("month_total") => month_total_schema(),
        Some("day_summary") => day_summary_schema(),
        Some("operating_hours") => operating_hours_schema(),
        _ => vec![],
    }
}

#[async_trait]
impl SimpleQueryHandler for CanchaHandler {
    async fn do_query<C>(&self, client: &mut C, query: &str) -> PgWireResult<Vec<Response>>
    where
        C: ClientInfo + ClientPortalStore + Sink<PgWireBackendMessage> + Unpin + Send + Sync,
        C::Error: Debug,
        PgWireError: From<C::Error>,
    {
        let venue = self.resolve_venue(client).await?;
        self.run(&venue, query).await
    }
}

// ── Extended Query Protocol ──────────────────────────────────────

#[derive(Debug)]
pub struct CanchaQueryParser;

#[async_trait]
impl QueryParser for CanchaQueryParser {
    type Statement = String;

    async fn parse_sql<C>(&self, _client: &C, sql: &str, _types: &[Option<Type>]) -> PgWireResult<String>
    where
        C: ClientInfo + Unpin + Send + Sync,
    {
        Ok(sql.to_string())
    }

    fn get_parameter_types(&self, stmt: &String) -> PgWireResult<Vec<Type>> {
        Ok(vec![Type::VARCHAR; count_params(stmt)])
    }

    fn get_result_schema(&self, stmt: &String, _column_format: Option<&Format>) -> PgWireResult<Vec<FieldInfo>> {
        Ok(result_schema(stmt))
    }
}

#[async_trait]
impl ExtendedQueryHandler for CanchaHandler {
    type Statement = String;
    type QueryParser = CanchaQueryParser;

    fn query_parser(&self) -> Arc<Self::QueryParser> {
        self.query_parser.clone()
    }

    async fn do_query<C>(
        &self,
        client: &mut C,
        portal: &Portal<Self::Statement>,
        _max_rows: usize,
    ) -> PgWireResult<Response>
    where
        C: ClientInfo + ClientPortalStore + Sink<PgWireBackendMessage> + Unpin + Send + Sync,
        C::PortalStore: PortalStore<Statement = Self::Statement>,
        C::Error: Debug,
        PgWireError: From<C::Error>,
    {
        let venue = self.resolve_venue(client).await?;
        let sql = substitute_params(portal);
        let mut responses = self.run(&venue, &sql).await?;
        Ok(responses.remove(0))
    }

    async fn do_describe_statement<C>(
        &self,
        _client: &mut C,
        target: &StoredStatement<Self::Statement>,
    ) -> PgWireResult<DescribeStatementResponse>
    where
        C: ClientInfo + ClientPortalStore + Sink<PgWireBackendMessage> + Unpin + Send + Sync,
        C::PortalStore: PortalStore<Statement = Self::Statement>,
        C::Error: Debug,
        PgWireError: From<C::Error>,
    {
        let param_types = vec![Type::VARCHAR; count_params(&target.statement)];
        Ok(DescribeStatementResponse::new(param_types, result_schema(&target.statement)))
    }

    async fn do_describe_portal<C>(
        &self,
        _client: &mut C,
        target: &Portal<Self::Statement>,
    ) -> PgWireResult<DescribePortalResponse>
    where
        C: ClientInfo + ClientPortalStore + Sink<PgWireBackendMessage> + Unpin + Send + Sync,
        C::PortalStore: PortalStore<Statement = Self::Statement>,
        C::Error: Debug,
        PgWireError: From<C::Error>,
    {
        Ok(DescribePortalResponse::new(result_schema(&target.statement.statement)))
    }
}

/// Every `$N` placeholder in `sql`: its byte range and `N`.
fn placeholders(sql: &str) -> Vec<(std::ops::Range<usize>, usize)> {
    let mut found = Vec::new();
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let dollar = i;
            i += 1;
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i > start
                && let Ok(n) = sql[start..i].parse::<usize>()
            {
                found.push((dollar..i, n));
            }
        } else {
            i += 1;
        }
    }
    found
}

/// Count the highest $N parameter placeholder in the SQL string.
fn count_params(sql: &str) -> usize {
    placeholders(sql).into_iter().map(|(_, n)| n).max().unwrap_or(0)
}

/// Substitute $1, $2, ... placeholders with bound parameter values (text format).
fn substitute_params(portal: &Portal<String>) -> String {
    bind_params(&portal.statement.statement, &portal.parameters)
}

/// One left-to-right pass, so bound text is never scanned for placeholders.
/// Placeholders with no bound value are left as written.
fn bind_params<P: AsRef<[u8]>>(sql: &str, params: &[Option<P>]) -> String {
    let mut result = String::with_capacity(sql.len());
    let mut copied = 0;
    for (range, n) in placeholders(sql) {
        let Some(param) = n.checked_sub(1).and_then(|i| params.get(i)) else {
            continue;
        };
        result.push_str(&sql[copied..range.start]);
        match param {
            Some(bytes) => {
                let text = String::from_utf8_lossy(bytes.as_ref());
                result.push('\'');
                result.push_str(&text.replace('\'', "''"));
                result.push('\'');
            }
            None => result.push_str("NULL"),
        }
        copied = range.end;
    }
    result.push_str(&sql[copied..]);
    result
}

// ── Factory ──────────────────────────────────────────────────────

/// Connections start in trust mode: there is no login step.
pub struct CanchaFactory {
    handler: Arc<CanchaHandler>,
    noop: Arc<NoopHandler>,
}

impl CanchaFactory {
    pub fn new(venue_manager: Arc<VenueManager>) -> Self {
        Self {
            handler: Arc::new(CanchaHandler::new(venue_manager)),
            noop: Arc::new(NoopHandler),
        }
    }
}

impl PgWireServerHandlers for CanchaFactory {
    fn simple_query_handler(&self) -> Arc<impl SimpleQueryHandler> {
        self.handler.clone()
    }

    fn extended_query_handler(&self) -> Arc<impl ExtendedQueryHandler> {
        self.handler.clone()
    }

    fn startup_handler(&self) -> Arc<impl StartupHandler> {
        self.noop.clone()
    }

    fn copy_handler(&self) -> Arc<impl CopyHandler> {
        self.noop.clone()
    }
}

/// Serve one client connection until it closes.
pub async fn process_connection(socket: TcpStream, venue_manager: Arc<VenueManager>) -> std::io::Result<()> {
    pgwire::tokio::process_socket(socket, None, CanchaFactory::new(venue_manager)).await
}

// ── Error mapping ────────────────────────────────────────────────

fn user_error(code: &str, message: String) -> PgWireError {
    PgWireError::UserError(Box::new(ErrorInfo::new("ERROR".into(), code.into(), message)))
}

fn engine_err(e: EngineError) -> PgWireError {
    match e {
        EngineError::InvariantViolation(_) => user_error("23P01", e.to_string()),
        _ => user_error("P0001", e.to_string()),
    }
}

fn fetch_err(e: crate::store::DataFetchError) -> PgWireError {
    engine_err(EngineError::Fetch(e))
}

fn model_err(e: ModelError) -> PgWireError {
    engine_err(EngineError::Model(e))
}

fn store_err(e: StoreError) -> PgWireError {
    debug!("write rejected: {e}");
    metrics::counter!(observability::WRITES_REJECTED_TOTAL).increment(1);
    user_error("P0001", e.to_string())
}

fn sql_err(e: crate::sql::SqlError) -> PgWireError {
    user_error("42601", e.to_string())
}
