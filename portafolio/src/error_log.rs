//! Persistence of ERROR-level tracing events into the `logs` table.
//!
//! [`ErrorLogLayer`] is a `tracing_subscriber` layer that copies every ERROR
//! event onto a bounded channel. [`spawn_writer`] drains that channel in the
//! background and inserts the events in batches. When the channel is full,
//! events are dropped rather than blocking the code that logged them.
//!
//! The writer reports its own failures at WARN so they never feed back into
//! the channel.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{PgPool, QueryBuilder};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber, debug, warn};
use tracing_subscriber::layer::{Context, Layer};

use crate::config::ErrorLogConfig;

/// One captured event, as stored in `logs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub meta: Option<Value>,
}

pub struct ErrorLogLayer {
    tx: mpsc::Sender<LogEntry>,
}

/// Receiving half handed to [`spawn_writer`].
pub struct ErrorLogReceiver {
    rx: mpsc::Receiver<LogEntry>,
}

/// Create a layer and the receiver its events arrive on.
pub fn channel(buffer_size: usize) -> (ErrorLogLayer, ErrorLogReceiver) {
    let (tx, rx) = mpsc::channel(buffer_size.max(1));
    (ErrorLogLayer { tx }, ErrorLogReceiver { rx })
}

#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl EventVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{value:?}")));
    }
}

impl<S: Subscriber> Layer<S> for ErrorLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() != Level::ERROR {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let mut fields = visitor.fields;
        fields.insert("target".to_string(), Value::from(metadata.target()));

        let entry = LogEntry {
            level: "error".to_string(),
            message: visitor.message.unwrap_or_default(),
            timestamp: Utc::now(),
            meta: Some(Value::Object(fields)),
        };

        // Full or closed channel: drop the event
        let _ = self.tx.try_send(entry);
    }
}

async fn write_batch(pool: &PgPool, batch: &mut Vec<LogEntry>) {
    if batch.is_empty() {
        return;
    }

    let entries = std::mem::take(batch);
    let count = entries.len();

    let mut query = QueryBuilder::<sqlx::Postgres>::new("INSERT INTO logs (level, message, timestamp, meta) ");
    query.push_values(entries, |mut row, entry| {
        row.push_bind(entry.level)
            .push_bind(entry.message)
            .push_bind(entry.timestamp)
            .push_bind(entry.meta);
    });

    match query.build().execute(pool).await {
        Ok(result) => debug!(rows = result.rows_affected(), "Flushed error log batch"),
        Err(e) => warn!(dropped = count, "Failed to write error log batch: {e}"),
    }
}

async fn run_writer(pool: PgPool, mut receiver: ErrorLogReceiver, batch_size: usize, flush_interval: Duration, shutdown: CancellationToken) {
    let batch_size = batch_size.max(1);
    let mut batch = Vec::with_capacity(batch_size);
    let mut timer = tokio::time::interval(flush_interval.max(Duration::from_millis(1)));
    timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = receiver.rx.recv() => match received {
                Some(entry) => {
                    batch.push(entry);
                    if batch.len() >= batch_size {
                        write_batch(&pool, &mut batch).await;
                    }
                }
                None => break,
            },
            _ = timer.tick() => write_batch(&pool, &mut batch).await,
        }
    }

    // Drain whatever is still queued
    while let Ok(entry) = receiver.rx.try_recv() {
        batch.push(entry);
        if batch.len() >= batch_size {
            write_batch(&pool, &mut batch).await;
        }
    }
    write_batch(&pool, &mut batch).await;
    debug!("Error log writer stopped");
}

/// Start the background writer. It flushes on `batch_size`, on every
/// `flush_interval`, and one last time when `shutdown` is cancelled.
pub fn spawn_writer(pool: PgPool, receiver: ErrorLogReceiver, config: &ErrorLogConfig, shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(run_writer(pool, receiver, config.batch_size, config.flush_interval, shutdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_layer_forwards_only_errors() {
        let (layer, mut receiver) = channel(8);
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("ignored");
            tracing::warn!("also ignored");
            tracing::error!(proyecto_id = 7, activo = true, "Import failed");
        });

        let entry = receiver.rx.try_recv().unwrap();
        assert_eq!(entry.level, "error");
        assert_eq!(entry.message, "Import failed");
        let meta = entry.meta.unwrap();
        assert_eq!(meta["proyecto_id"], 7);
        assert_eq!(meta["activo"], true);
        assert!(meta["target"].as_str().unwrap().starts_with("portafolio"));

        assert!(receiver.rx.try_recv().is_err());
    }

    #[test]
    fn test_full_channel_drops_events() {
        let (layer, mut receiver) = channel(1);
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("first");
            tracing::error!("second");
        });

        assert_eq!(receiver.rx.try_recv().unwrap().message, "first");
        assert!(receiver.rx.try_recv().is_err());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_writer_flushes_on_shutdown(pool: PgPool) {
        let (layer, receiver) = channel(16);
        let config = ErrorLogConfig {
            enabled: true,
            buffer_size: 16,
            batch_size: 100,
            flush_interval: Duration::from_secs(3600),
        };
        let shutdown = CancellationToken::new();
        let handle = spawn_writer(pool.clone(), receiver, &config, shutdown.clone());

        for i in 0..3 {
            layer
                .tx
                .send(LogEntry {
                    level: "error".to_string(),
                    message: format!("failure {i}"),
                    timestamp: Utc::now(),
                    meta: None,
                })
                .await
                .unwrap();
        }

        shutdown.cancel();
        handle.await.unwrap();

        let messages: Vec<String> = sqlx::query_scalar("SELECT message FROM logs ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(messages, vec!["failure 0", "failure 1", "failure 2"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_writer_survives_zero_flush_interval(pool: PgPool) {
        let (_layer, receiver) = channel(4);
        let config = ErrorLogConfig {
            enabled: true,
            buffer_size: 4,
            batch_size: 10,
            flush_interval: Duration::ZERO,
        };
        let shutdown = CancellationToken::new();
        let handle = spawn_writer(pool, receiver, &config, shutdown.clone());

        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();
        assert!(handle.await.is_ok());
    }
}
