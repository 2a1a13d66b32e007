use crate::error::CodecError;
use crate::types::ProbeMessage;

/// Закодировать сообщение в wire-формат `"<sequence_id>:<sent_micros>"`.
pub fn encode(sequence_id: u64, sent_micros: i64) -> String {
    format!("{sequence_id}:{sent_micros}")
}

/// Разобрать wire-тело обратно в `ProbeMessage`.
///
/// Делит по первому двоеточию; обе части обязаны парситься как целые.
/// Всё остальное — `Malformed` (сообщение отбрасывается вызывающим).
pub fn decode(body: &str) -> Result<ProbeMessage, CodecError> {
    let (seq, micros) = body.split_once(':').ok_or_else(|| CodecError::Malformed {
        body: body.to_string(),
        reason: "expected '<seq>:<micros>'".to_string(),
    })?;

    let sequence_id: u64 = seq.parse().map_err(|_| CodecError::Malformed {
        body: body.to_string(),
        reason: format!("bad sequence id '{seq}'"),
    })?;

    let sent_micros: i64 = micros.parse().map_err(|_| CodecError::Malformed {
        body: body.to_string(),
        reason: format!("bad send timestamp '{micros}'"),
    })?;

    Ok(ProbeMessage {
        sequence_id,
        sent_micros,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        for (seq, micros) in [(0u64, 0i64), (2, 1_650_000_000_000_000), (999, 1)] {
            let msg = decode(&encode(seq, micros)).unwrap();
            assert_eq!(msg, ProbeMessage { sequence_id: seq, sent_micros: micros });
        }
    }

    #[test]
    fn encode_format() {
        assert_eq!(encode(1, 1650000000000000), "1:1650000000000000");
    }

    #[test]
    fn rejects_body_without_colon() {
        assert!(matches!(decode("abc"), Err(CodecError::Malformed { .. })));
    }

    #[test]
    fn rejects_empty_body() {
        assert!(matches!(decode(""), Err(CodecError::Malformed { .. })));
    }

    #[test]
    fn rejects_extra_field() {
        // Split по первому ':' — остаток "2:3" не целое.
        assert!(matches!(decode("1:2:3"), Err(CodecError::Malformed { .. })));
    }

    #[test]
    fn rejects_non_numeric_sequence() {
        assert!(matches!(decode("notanumber:123"), Err(CodecError::Malformed { .. })));
    }

    #[test]
    fn rejects_negative_sequence() {
        assert!(matches!(decode("-1:123"), Err(CodecError::Malformed { .. })));
    }
}
