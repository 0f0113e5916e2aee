use crate::check::{resolve_host, CheckResult};
use crate::config::CheckConfig;
use crate::probe::Probe;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Owns one periodic task per enabled CheckConfig.
pub struct CheckScheduler {
    pub configs: Vec<CheckConfig>,
    tx: UnboundedSender<CheckResult>,
    token: CancellationToken,
}

impl CheckScheduler {
    pub fn new(
        configs: Vec<CheckConfig>,
        tx: UnboundedSender<CheckResult>,
        token: CancellationToken,
    ) -> Self {
        Self { configs, tx, token }
    }

    /// Start a task for every enabled config and return their handles.
    ///
    /// Disabled configs are skipped. Each task stops when the token is
    /// cancelled or the aggregator side of the channel is gone.
    pub fn start_all_tasks(&self) -> Vec<JoinHandle<()>> {
        self.configs
            .iter()
            .filter(|config| {
                if !config.enabled {
                    debug!("Skipping disabled check '{}'", config.label);
                }
                config.enabled
            })
            .map(|config| {
                let config = config.clone();
                let tx = self.tx.clone();
                let token = self.token.child_token();
                tokio::spawn(run_check_loop(config, tx, token))
            })
            .collect()
    }
}

async fn run_check_loop(
    config: CheckConfig,
    tx: UnboundedSender<CheckResult>,
    token: CancellationToken,
) {
    let probe = Probe::for_config(&config);
    let interval = config.interval();
    info!(
        "⏰ Scheduling '{}' ({}) every {:?}",
        config.label,
        probe.command_name(),
        interval
    );

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = token.cancelled() => break,
        }

        let results = probe.run(&config).await;
        let host = resolve_host();
        for result in results {
            if result.retval != 0 {
                debug!("Check '{}' failed: {}", result.config_label, result.output);
            }
            if tx.send(result.with_host(host.clone())).is_err() {
                warn!("Aggregator is gone, stopping check '{}'", config.label);
                return;
            }
        }
    }

    debug!("Check '{}' stopped", config.label);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommandType;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn external(label: &str, command: &str, params: &[&str], enabled: bool) -> CheckConfig {
        CheckConfig {
            label: label.to_string(),
            command_type: CommandType::External,
            command: command.to_string(),
            check_freq: 1,
            params: params.iter().map(|p| p.to_string()).collect(),
            enabled,
        }
    }

    #[tokio::test]
    async fn test_disabled_configs_are_not_scheduled() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let scheduler = CheckScheduler::new(
            vec![
                external("on", "true", &[], true),
                external("off", "true", &[], false),
            ],
            tx,
            token.clone(),
        );

        let handles = scheduler.start_all_tasks();
        assert_eq!(handles.len(), 1);
        token.cancel();
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_results_are_stamped_and_emitted_in_tick_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let scheduler = CheckScheduler::new(
            vec![external("echo", "echo", &["tick"], true)],
            tx,
            token.clone(),
        );
        let handles = scheduler.start_all_tasks();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        token.cancel();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(first.config_label, "echo");
        assert_eq!(first.retval, 0);
        assert_eq!(first.output, "Success: tick\n");
        assert!(!first.host.is_empty());
        assert!(first.epoch_time <= second.epoch_time);
    }

    #[tokio::test]
    async fn test_failing_probe_does_not_end_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let scheduler = CheckScheduler::new(
            vec![external("broken", "/no/such/check", &[], true)],
            tx,
            token.clone(),
        );
        let handles = scheduler.start_all_tasks();

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        token.cancel();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(first.retval, 1);
        assert_eq!(second.retval, 1);
        assert!(first.output.contains("can't find external utility"));
    }

    #[tokio::test]
    async fn test_cancel_stops_sleeping_task() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let mut config = external("slow", "true", &[], true);
        config.check_freq = 3600;
        let scheduler = CheckScheduler::new(vec![config], tx, token.clone());
        let handles = scheduler.start_all_tasks();

        token.cancel();
        for handle in handles {
            tokio::time::timeout(Duration::from_secs(1), handle)
                .await
                .unwrap()
                .unwrap();
        }
    }
}
