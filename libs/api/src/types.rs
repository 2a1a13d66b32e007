use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════
//  ProbeMessage
// ════════════════════════════════════════════════════════════════

/// Wire-сообщение probe: позиция в batch'е + время отправки.
///
/// Транзиентное — живёт только между `encode` у publisher'а и
/// `decode` у listener'а. На проводе: `"<sequence_id>:<sent_micros>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeMessage {
    /// Zero-based позиция сообщения в batch'е.
    pub sequence_id: u64,
    /// Время отправки, микросекунды Unix epoch.
    pub sent_micros: i64,
}

// ════════════════════════════════════════════════════════════════
//  ReportRecord
// ════════════════════════════════════════════════════════════════

/// Durable-корреляция одного сообщения: (sent, received, delay),
/// ключ — sequence id. Создаётся ровно один раз listener'ом в момент
/// приёма и дальше не мутируется.
///
/// Persisted-представление кодирует целые поля строками
/// (`"id": "0"`, `"sent": "…"`) — совместимо с report-файлами,
/// которые читают внешние инструменты.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub channel: String,
    pub client: String,
    #[serde(with = "int_string")]
    pub id: u64,
    #[serde(with = "int_string")]
    pub sent: i64,
    #[serde(with = "int_string")]
    pub received: i64,
    #[serde(with = "int_string")]
    pub delay: i64,
}

impl ReportRecord {
    /// Скоррелировать отправку и приём: `delay = received - sent`.
    pub fn correlate(
        channel: impl Into<String>,
        client: impl Into<String>,
        sequence_id: u64,
        sent_micros: i64,
        received_micros: i64,
    ) -> Self {
        Self {
            channel: channel.into(),
            client: client.into(),
            id: sequence_id,
            sent: sent_micros,
            received: received_micros,
            delay: received_micros - sent_micros,
        }
    }
}

// ── serde: целое как строка ──

mod int_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: std::fmt::Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlate_computes_delay() {
        let r = ReportRecord::correlate("bench", "bold_meitner", 0, 1000, 1500);
        assert_eq!(r.delay, 500);
        assert_eq!(r.id, 0);
    }

    #[test]
    fn correlate_negative_delay_kept_as_is() {
        // Clock skew между устройствами не компенсируется.
        let r = ReportRecord::correlate("bench", "c", 1, 2000, 1500);
        assert_eq!(r.delay, -500);
    }

    #[test]
    fn record_serializes_integers_as_strings() {
        let r = ReportRecord::correlate("bench", "c", 2, 100, 350);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["id"], "2");
        assert_eq!(json["sent"], "100");
        assert_eq!(json["received"], "350");
        assert_eq!(json["delay"], "250");
        assert_eq!(json["channel"], "bench");
    }

    #[test]
    fn record_roundtrips_through_json() {
        let r = ReportRecord::correlate("bench", "c", 7, 42, 99);
        let json = serde_json::to_string(&r).unwrap();
        let back: ReportRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn record_with_non_numeric_field_fails_to_parse() {
        let json = r#"{"channel":"b","client":"c","id":"x","sent":"1","received":"2","delay":"1"}"#;
        assert!(serde_json::from_str::<ReportRecord>(json).is_err());
    }
}
