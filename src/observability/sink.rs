//! Log sink construction and record formats.
//!
//! # Responsibilities
//! - Build the console layer in the format selected by the environment tag
//! - Build the optional JSON file layer
//! - Apply the severity filter over the whole sink set
//!
//! # Design Decisions
//! - Development format: `[HH:mm:ss LVL] message`, error detail on the next
//!   line — fixed positions for human scanning
//! - Structured format: one JSON object per line, enrichment fields merged in
//! - The whole sink set is one boxed layer so it can be swapped atomically

use std::fmt;
use std::fmt::Write as _;
use std::fs::File;
use std::sync::Arc;

use chrono::{Local, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{JsonFields, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields, MakeWriter};
use tracing_subscriber::layer::Layer;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Registry};

use crate::error::BootError;
use crate::identity::EnvironmentTag;

/// The complete sink set, swappable as one unit.
pub(crate) type SinkLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Attributes attached to every structured record.
#[derive(Debug, Clone)]
pub(crate) struct Enrichment {
    pub app: String,
    pub machine: Option<String>,
    pub thread: bool,
    pub extra: Vec<(String, String)>,
}

impl Enrichment {
    /// Bootstrap phase: app name only.
    pub fn bootstrap(app: String) -> Self {
        Self {
            app,
            machine: None,
            thread: false,
            extra: Vec::new(),
        }
    }

    /// Runtime phase: app name, machine identity, thread identity and any
    /// registry-contributed fields.
    pub fn runtime(app: String, machine: String, extra: Vec<(String, String)>) -> Self {
        Self {
            app,
            machine: Some(machine),
            thread: true,
            extra,
        }
    }
}

/// Build the full sink layer: console (+ optional file) behind a filter.
pub(crate) fn build_layer(
    environment: &EnvironmentTag,
    enrichment: Enrichment,
    directives: &str,
    file: Option<Arc<File>>,
) -> Result<SinkLayer, BootError> {
    let filter = EnvFilter::try_new(directives).map_err(|e| {
        BootError::Logging(format!("invalid filter directives '{directives}': {e}"))
    })?;
    Ok(layer_with(filter, environment, enrichment, file))
}

/// Assemble the sink set behind an already-constructed filter.
pub(crate) fn layer_with(
    filter: EnvFilter,
    environment: &EnvironmentTag,
    enrichment: Enrichment,
    file: Option<Arc<File>>,
) -> SinkLayer {
    // The filter rides inside the boxed set as a plain layer rather than a
    // `Filtered` wrapper: reloading a `Filtered` layer panics because its
    // `FilterId` is only registered when the subscriber is first built.
    let mut sinks: Vec<SinkLayer> = vec![
        filter.boxed(),
        console_layer(environment, enrichment.clone(), std::io::stdout),
    ];

    if let Some(file) = file {
        sinks.push(file_layer(enrichment, file));
    }

    sinks.boxed()
}

/// Console layer in the format selected by the environment tag.
pub(crate) fn console_layer<W>(
    environment: &EnvironmentTag,
    enrichment: Enrichment,
    writer: W,
) -> SinkLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if environment.is_development() {
        tracing_subscriber::fmt::layer()
            .event_format(DevFormat)
            .with_writer(writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .fmt_fields(JsonFields::new())
            .event_format(JsonFormat::new(enrichment))
            .with_writer(writer)
            .boxed()
    }
}

/// File layer appending one JSON record per line.
fn file_layer(enrichment: Enrichment, file: Arc<File>) -> SinkLayer {
    tracing_subscriber::fmt::layer()
        .fmt_fields(JsonFields::new())
        .event_format(JsonFormat::new(enrichment))
        .with_writer(file)
        .boxed()
}

/// Human-readable development format: `[HH:mm:ss LVL] message`, error detail
/// on the following line. Span scope is rendered as a `name:` prefix chain.
pub(crate) struct DevFormat;

impl<S, N> FormatEvent<S, N> for DevFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        write!(
            writer,
            "[{} {}] ",
            Local::now().format("%H:%M:%S"),
            short_level(event.metadata().level())
        )?;

        if let Some(scope) = ctx.event_scope() {
            let mut seen = false;
            for span in scope.from_root() {
                seen = true;
                write!(writer, "{}", span.name())?;
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.fields.is_empty() {
                        write!(writer, "{{{}}}", fields.fields.as_str())?;
                    }
                }
                writer.write_char(':')?;
            }
            if seen {
                writer.write_char(' ')?;
            }
        }

        write!(writer, "{}", visitor.message)?;
        for (key, value) in &visitor.fields {
            write!(writer, " {}={}", key, display_value(value))?;
        }
        if let Some(error) = &visitor.error {
            writeln!(writer)?;
            write!(writer, "{}", error)?;
        }
        writeln!(writer)
    }
}

/// Structured format: one JSON object per line, enrichment merged in, span
/// scope (the ambient log-context) under `spans`.
pub(crate) struct JsonFormat {
    enrichment: Enrichment,
}

impl JsonFormat {
    pub fn new(enrichment: Enrichment) -> Self {
        Self { enrichment }
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        let mut record = Map::new();
        record.insert(
            "timestamp".into(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        record.insert("level".into(), Value::String(meta.level().to_string()));
        record.insert("target".into(), Value::String(meta.target().to_string()));
        record.insert("message".into(), Value::String(visitor.message));

        record.insert("app".into(), Value::String(self.enrichment.app.clone()));
        if let Some(machine) = &self.enrichment.machine {
            record.insert("machine".into(), Value::String(machine.clone()));
        }
        if self.enrichment.thread {
            let current = std::thread::current();
            if let Some(name) = current.name() {
                record.insert("thread_name".into(), Value::String(name.to_string()));
            }
            record.insert(
                "thread_id".into(),
                Value::String(format!("{:?}", current.id())),
            );
        }
        for (key, value) in &self.enrichment.extra {
            record.insert(key.clone(), Value::String(value.clone()));
        }

        if let Some(error) = visitor.error {
            record.insert("error".into(), Value::String(error));
        }
        for (key, value) in visitor.fields {
            record.insert(key, value);
        }

        let mut spans = Vec::new();
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                let mut entry = Map::new();
                entry.insert("name".into(), Value::String(span.name().to_string()));
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    match serde_json::from_str::<Value>(fields.fields.as_str()) {
                        Ok(Value::Object(parsed)) => entry.extend(parsed),
                        _ if !fields.fields.is_empty() => {
                            entry.insert(
                                "fields".into(),
                                Value::String(fields.fields.as_str().to_string()),
                            );
                        }
                        _ => {}
                    }
                }
                spans.push(Value::Object(entry));
            }
        }
        if !spans.is_empty() {
            record.insert("spans".into(), Value::Array(spans));
        }

        let line = serde_json::to_string(&Value::Object(record)).map_err(|_| fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

/// Collects event fields, separating the message and any error detail.
#[derive(Default)]
struct FieldVisitor {
    message: String,
    error: Option<String>,
    fields: Vec<(String, Value)>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "error" => self.error = Some(format!("{value:?}")),
            name => self
                .fields
                .push((name.to_string(), Value::String(format!("{value:?}")))),
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "error" => self.error = Some(value.to_string()),
            name => self
                .fields
                .push((name.to_string(), Value::String(value.to_string()))),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.push((field.name().to_string(), Value::from(value)));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.push((field.name().to_string(), Value::from(value)));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.push((field.name().to_string(), Value::from(value)));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.push((field.name().to_string(), Value::from(value)));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        let text = value.to_string();
        if field.name() == "error" {
            self.error = Some(text);
        } else {
            self.fields.push((field.name().to_string(), Value::String(text)));
        }
    }
}

fn short_level(level: &Level) -> &'static str {
    if *level == Level::TRACE {
        "TRC"
    } else if *level == Level::DEBUG {
        "DBG"
    } else if *level == Level::INFO {
        "INF"
    } else if *level == Level::WARN {
        "WRN"
    } else {
        "ERR"
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }

        fn make_writer(&self) -> impl for<'w> MakeWriter<'w> + Send + Sync + 'static {
            let capture = self.clone();
            move || capture.clone()
        }
    }

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_development_format_template() {
        let capture = Capture::default();
        let layer = console_layer(
            &EnvironmentTag::from_value("Development"),
            Enrichment::bootstrap("demo".into()),
            capture.make_writer(),
        );
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(user = "bob", "hello world");
        });

        let out = capture.contents();
        assert!(out.starts_with('['), "expected timestamp prefix: {out}");
        assert!(out.contains("INF] hello world"), "unexpected line: {out}");
        assert!(out.contains("user=bob"), "unexpected line: {out}");
    }

    #[test]
    fn test_development_format_error_on_next_line() {
        let capture = Capture::default();
        let layer = console_layer(
            &EnvironmentTag::from_value("Development"),
            Enrichment::bootstrap("demo".into()),
            capture.make_writer(),
        );
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(error = %"boom", "An error occured; Terminating");
        });

        let out = capture.contents();
        let mut lines = out.lines();
        let first = lines.next().unwrap();
        let second = lines.next().unwrap();
        assert!(first.contains("ERR] An error occured; Terminating"));
        assert_eq!(second, "boom");
    }

    #[test]
    fn test_structured_format_is_json_per_line() {
        let capture = Capture::default();
        let layer = console_layer(
            &EnvironmentTag::from_value("Production"),
            Enrichment::runtime(
                "demo".into(),
                "m1".into(),
                vec![("component".into(), "test".into())],
            ),
            capture.make_writer(),
        );
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("request", request_id = "abc");
            let _enter = span.enter();
            tracing::info!(code = 7_i64, "hello world");
        });

        let out = capture.contents();
        let line = out.lines().next().unwrap();
        let record: Value = serde_json::from_str(line).unwrap();

        assert_eq!(record["level"], "INFO");
        assert_eq!(record["message"], "hello world");
        assert_eq!(record["app"], "demo");
        assert_eq!(record["machine"], "m1");
        assert_eq!(record["component"], "test");
        assert_eq!(record["code"], 7);
        assert!(record["thread_id"].is_string());
        assert!(record["timestamp"].is_string());

        let spans = record["spans"].as_array().unwrap();
        assert_eq!(spans[0]["name"], "request");
        assert_eq!(spans[0]["request_id"], "abc");
    }

    #[test]
    fn test_build_layer_rejects_bad_directives() {
        let result = build_layer(
            &EnvironmentTag::from_value("Development"),
            Enrichment::bootstrap("demo".into()),
            "not a directive!!!",
            None,
        );
        assert!(result.is_err());
    }
}
