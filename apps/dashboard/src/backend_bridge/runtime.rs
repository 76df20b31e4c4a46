//! Backend worker: owns the tokio runtime and runs one task per command.

use std::{sync::Arc, thread};

use client_core::{AppConfig, BackendCommand, Services, UiError, UiErrorContext, UiEvent};
use crossbeam_channel::{Receiver, Sender, TrySendError};

pub fn launch(config: AppConfig, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::Session,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let services = match Services::from_config(&config).await {
                Ok(services) => Arc::new(services),
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::Session,
                        format!("backend worker startup failure: {err:#}"),
                    )));
                    tracing::error!("failed to initialize backend services: {err:#}");
                    return;
                }
            };
            tracing::info!("backend worker ready");

            while let Ok(cmd) = cmd_rx.recv() {
                let services = Arc::clone(&services);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let name = cmd.name();
                    let event = services.execute(cmd).await;
                    match ui_tx.try_send(event) {
                        Ok(()) => tracing::debug!(command = name, "backend->ui event queued"),
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!(command = name, "ui event queue full; result dropped")
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            tracing::debug!(command = name, "ui loop gone; result dropped")
                        }
                    }
                });
            }
            tracing::info!("command queue closed; backend worker stopping");
        });
    });
}
