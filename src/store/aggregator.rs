use super::ResultStore;
use crate::check::CheckResult;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Spawn the single writer that moves results from the scheduler channel into `store`.
///
/// The task ends once every sender is dropped. Cancelling `token` does not
/// discard anything: results queued or sent afterwards are still stored.
pub fn spawn_aggregator(
    store: ResultStore,
    mut rx: UnboundedReceiver<CheckResult>,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("Aggregator started");
        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(result) => store.append(result).await,
                    None => {
                        debug!("All schedulers closed their channel");
                        break;
                    }
                },
                _ = token.cancelled() => {
                    // Schedulers send their in-flight result before dropping
                    // their sender, so keep storing until the channel closes.
                    let mut late = 0usize;
                    while let Some(result) = rx.recv().await {
                        store.append(result).await;
                        late += 1;
                    }
                    debug!("Stored {} result(s) after cancellation", late);
                    break;
                }
            }
        }
        info!("Aggregator stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn result(label: &str) -> CheckResult {
        CheckResult {
            config_label: label.to_string(),
            ..CheckResult::default()
        }
    }

    #[tokio::test]
    async fn test_aggregator_stores_in_arrival_order() {
        let store = ResultStore::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_aggregator(store.clone(), rx, CancellationToken::new());

        tx.send(result("a")).unwrap();
        tx.send(result("b")).unwrap();
        tx.send(result("c")).unwrap();
        drop(tx);
        handle.await.unwrap();

        let labels: Vec<_> = store.list().await.into_iter().map(|r| r.config_label).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_cancel_flushes_queued_results() {
        let store = ResultStore::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();

        tx.send(result("queued")).unwrap();
        token.cancel();
        let handle = spawn_aggregator(store.clone(), rx, token);
        drop(tx);
        handle.await.unwrap();

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_result_sent_after_cancel_is_stored() {
        let store = ResultStore::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let handle = spawn_aggregator(store.clone(), rx, token.clone());

        tx.send(result("before")).unwrap();
        token.cancel();
        tokio::task::yield_now().await;

        // A probe that was still running when shutdown began.
        let in_flight = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            tx.send(result("in-flight")).unwrap();
        });
        in_flight.await.unwrap();
        handle.await.unwrap();

        let labels: Vec<_> = store.list().await.into_iter().map(|r| r.config_label).collect();
        assert_eq!(labels, vec!["before", "in-flight"]);
    }
}
