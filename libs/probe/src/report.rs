use probe_api::{ReportRecord, ReportStore};

use crate::error::ProbeError;

/// Агрегат полного batch'а: ровно `N` записей `0..N-1` плюс средняя
/// задержка.
#[derive(Debug)]
pub struct LatencyReport {
    pub rows: Vec<ReportRecord>,
    pub average_micros: i64,
}

/// Прочитать ровно `batch_size` записей по sequence id и посчитать
/// среднее целочисленным (усекающим) делением.
///
/// Политика all-or-nothing: отсутствие или порча любой записи фатальна —
/// отчёт по неполному batch'у не строится и среднее никогда не считается
/// по меньшему числу записей.
pub async fn aggregate(
    store: &dyn ReportStore,
    batch_size: u64,
) -> Result<LatencyReport, ProbeError> {
    if batch_size == 0 {
        return Err(ProbeError::Config("batch size must be positive".into()));
    }

    let mut rows = Vec::with_capacity(batch_size as usize);
    for seq in 0..batch_size {
        rows.push(store.get(seq).await?);
    }

    let sum: i64 = rows.iter().map(|r| r.delay).sum();
    let average_micros = sum / batch_size as i64;

    Ok(LatencyReport {
        rows,
        average_micros,
    })
}

impl LatencyReport {
    /// Таблица в стиле "light": `#`, `SENT`, `RECEIVED`, `LATENCY`
    /// построчно + footer `AVERAGE`. Единственный не-лог вывод pipeline'а.
    pub fn render(&self) -> String {
        const HEADERS: [&str; 4] = ["#", "SENT", "RECEIVED", "LATENCY"];

        let rows: Vec<[String; 4]> = self
            .rows
            .iter()
            .map(|r| {
                [
                    r.id.to_string(),
                    r.sent.to_string(),
                    r.received.to_string(),
                    r.delay.to_string(),
                ]
            })
            .collect();
        let footer = [
            String::new(),
            String::new(),
            "AVERAGE".to_string(),
            self.average_micros.to_string(),
        ];

        let mut widths: [usize; 4] = [0; 4];
        for (i, h) in HEADERS.iter().enumerate() {
            widths[i] = h.len();
        }
        for row in rows.iter().chain(std::iter::once(&footer)) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }

        let rule = |left: char, mid: char, right: char| {
            let mut s = String::new();
            s.push(left);
            for (i, w) in widths.iter().enumerate() {
                s.push_str(&"─".repeat(w + 2));
                s.push(if i + 1 < widths.len() { mid } else { right });
            }
            s.push('\n');
            s
        };
        let line = |cells: &[String; 4]| {
            let mut s = String::new();
            for (i, cell) in cells.iter().enumerate() {
                s.push_str(if i == 0 { "│ " } else { " " });
                s.push_str(&format!("{cell:>width$} │", width = widths[i]));
            }
            s.push('\n');
            s
        };

        let header: [String; 4] = HEADERS.map(str::to_string);
        let mut out = String::new();
        out.push_str(&rule('┌', '┬', '┐'));
        out.push_str(&line(&header));
        out.push_str(&rule('├', '┼', '┤'));
        for row in &rows {
            out.push_str(&line(row));
        }
        out.push_str(&rule('├', '┼', '┤'));
        out.push_str(&line(&footer));
        out.push_str(&rule('└', '┴', '┘'));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_api::StoreError;
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;

    /// Минимальный синхронный store для юнит-тестов агрегатора.
    #[derive(Default)]
    struct MapStore {
        records: HashMap<u64, ReportRecord>,
    }

    impl MapStore {
        fn with_delays(delays: &[i64]) -> Self {
            let mut records = HashMap::new();
            for (seq, &delay) in delays.iter().enumerate() {
                let seq = seq as u64;
                let sent = 1_000 * (seq as i64 + 1);
                records.insert(
                    seq,
                    ReportRecord::correlate("bench", "c", seq, sent, sent + delay),
                );
            }
            Self { records }
        }
    }

    impl ReportStore for MapStore {
        fn put(
            &self,
            _record: &ReportRecord,
        ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
            unimplemented!("aggregator never writes")
        }

        fn get(
            &self,
            sequence_id: u64,
        ) -> Pin<Box<dyn Future<Output = Result<ReportRecord, StoreError>> + Send + '_>> {
            let res = self
                .records
                .get(&sequence_id)
                .cloned()
                .ok_or(StoreError::NotFound(sequence_id));
            Box::pin(async move { res })
        }
    }

    #[tokio::test]
    async fn average_of_full_batch() {
        let store = MapStore::with_delays(&[400, 600, 500]);
        let report = aggregate(&store, 3).await.unwrap();
        assert_eq!(report.average_micros, 500);
        assert_eq!(report.rows.len(), 3);
    }

    #[tokio::test]
    async fn average_truncates() {
        // 400 + 601 + 500 = 1501 → 500
        let store = MapStore::with_delays(&[400, 601, 500]);
        let report = aggregate(&store, 3).await.unwrap();
        assert_eq!(report.average_micros, 500);
    }

    #[tokio::test]
    async fn partial_batch_is_fatal() {
        let store = MapStore::with_delays(&[400, 600]);
        let err = aggregate(&store, 3).await.unwrap_err();
        assert!(matches!(err, ProbeError::Store(StoreError::NotFound(2))));
    }

    #[tokio::test]
    async fn zero_batch_is_config_error() {
        let store = MapStore::default();
        assert!(matches!(
            aggregate(&store, 0).await,
            Err(ProbeError::Config(_))
        ));
    }

    #[tokio::test]
    async fn render_has_rows_and_average_footer() {
        let store = MapStore::with_delays(&[400, 601, 500]);
        let report = aggregate(&store, 3).await.unwrap();
        let table = report.render();

        // 3 строки данных + header + footer
        let data_lines: Vec<&str> = table
            .lines()
            .filter(|l| l.starts_with('│'))
            .collect();
        assert_eq!(data_lines.len(), 5);
        assert!(table.contains("AVERAGE"));
        assert!(table.contains("LATENCY"));
        assert!(data_lines.last().unwrap().contains("500"));
    }
}
