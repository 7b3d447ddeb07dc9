// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wagate serve`: wire storage, registry, pipeline, and gateway together.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use wagate_config::WagateConfig;
use wagate_core::{InstanceId, MessageStore, PluginAdapter, WagateError};
use wagate_dispatch::DispatchPipeline;
use wagate_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig};
use wagate_registry::InstanceRegistry;
use wagate_storage::SqliteStorage;
use wagate_whatsapp::{CloudApiSession, CloudApiSessionConfig};

use crate::shutdown::install_signal_handler;

/// Extra time granted to in-flight requests beyond the send timeout.
const DRAIN_MARGIN: Duration = Duration::from_secs(5);

/// Runs the gateway until SIGINT/SIGTERM.
pub async fn run_serve(config: WagateConfig) -> Result<(), WagateError> {
    init_tracing(&config.server.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "starting wagate serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let registry = Arc::new(build_registry(&config)?);

    let send_timeout = Duration::from_secs(config.dispatch.send_timeout_secs);
    let pipeline = Arc::new(DispatchPipeline::new(
        Arc::clone(&registry),
        storage.clone(),
        send_timeout,
    ));

    if config.server.bearer_token.is_none() {
        warn!("server.bearer_token is not set -- every API request will be rejected");
    }

    let shutdown = install_signal_handler();
    let dispatch_cancel = CancellationToken::new();

    let state = GatewayState {
        pipeline,
        registry,
        store: storage.clone(),
        auth: AuthConfig {
            bearer_token: config.server.bearer_token.clone(),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
        },
        cancel: dispatch_cancel.clone(),
    };
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    let mut server = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { wagate_gateway::start_server(&server_config, state, shutdown).await }
    });

    let result = tokio::select! {
        joined = &mut server => flatten(joined),
        _ = shutdown.cancelled() => {
            let grace = send_timeout + DRAIN_MARGIN;
            match tokio::time::timeout(grace, &mut server).await {
                Ok(joined) => flatten(joined),
                Err(_) => {
                    warn!(grace_secs = grace.as_secs(), "requests still in flight, abandoning pending sends");
                    dispatch_cancel.cancel();
                    flatten(server.await)
                }
            }
        }
    };

    if let Err(e) = storage.shutdown().await {
        error!(error = %e, "storage shutdown failed");
    }
    info!("wagate stopped");
    result
}

/// Registers every configured instance: with credentials it gets a live
/// Cloud API session, without them it waits as pending.
fn build_registry(config: &WagateConfig) -> Result<InstanceRegistry, WagateError> {
    let registry = InstanceRegistry::new();
    for instance in &config.instances {
        match CloudApiSessionConfig::from_instance(instance, &config.whatsapp)? {
            Some(session_config) => {
                let session = CloudApiSession::new(session_config)?;
                registry.authenticate(Arc::new(session));
            }
            None => {
                registry.register_pending(InstanceId::from(instance.id.as_str()));
                info!(instance_id = %instance.id, "instance registered without credentials (pending)");
            }
        }
    }
    Ok(registry)
}

fn flatten(
    joined: Result<Result<(), WagateError>, tokio::task::JoinError>,
) -> Result<(), WagateError> {
    joined.map_err(|e| WagateError::Internal(format!("gateway task failed: {e}")))?
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wagate={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use wagate_config::model::InstanceConfig;
    use tracing_test::traced_test;
    use wagate_registry::InstanceStatus;

    #[test]
    fn instances_with_credentials_are_authenticated() {
        let mut config = WagateConfig::default();
        config.instances = vec![
            InstanceConfig {
                id: "abc".into(),
                phone: "5511999990000".into(),
                phone_number_id: Some("1098765".into()),
                access_token: Some("token".into()),
            },
            InstanceConfig {
                id: "later".into(),
                phone: "5511977770000".into(),
                phone_number_id: None,
                access_token: None,
            },
        ];

        let registry = build_registry(&config).unwrap();
        assert_eq!(
            registry.status(&InstanceId::from("abc")),
            Some(InstanceStatus::Authenticated)
        );
        assert_eq!(
            registry.status(&InstanceId::from("later")),
            Some(InstanceStatus::Pending)
        );

        let handle = registry
            .get_authenticated_instance(&InstanceId::from("abc"))
            .unwrap();
        assert_eq!(handle.own_address().user(), "5511999990000");
    }

    #[test]
    #[traced_test]
    fn bootstrap_logs_each_authentication_once() {
        let mut config = WagateConfig::default();
        config.instances = vec![InstanceConfig {
            id: "abc".into(),
            phone: "5511999990000".into(),
            phone_number_id: Some("1098765".into()),
            access_token: Some("token".into()),
        }];

        build_registry(&config).unwrap();
        logs_assert(|lines: &[&str]| {
            match lines
                .iter()
                .filter(|line| line.contains("instance authenticated"))
                .count()
            {
                1 => Ok(()),
                n => Err(format!("expected one authentication log, found {n}")),
            }
        });
    }

    #[test]
    fn join_errors_become_internal_errors() {
        let ok: Result<Result<(), WagateError>, tokio::task::JoinError> = Ok(Ok(()));
        assert!(flatten(ok).is_ok());
    }
}
