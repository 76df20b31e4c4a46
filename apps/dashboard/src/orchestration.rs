//! Hands controller commands to the backend queue without blocking the UI loop.

use client_core::BackendCommand;
use crossbeam_channel::{Sender, TrySendError};

pub fn dispatch_backend_commands(
    cmd_tx: &Sender<BackendCommand>,
    commands: Vec<BackendCommand>,
    status: &mut String,
) {
    for cmd in commands {
        let cmd_name = cmd.name();
        match cmd_tx.try_send(cmd) {
            Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
            Err(TrySendError::Full(_)) => {
                *status = format!("Command queue is full; `{cmd_name}` was not sent, please retry");
            }
            Err(TrySendError::Disconnected(_)) => {
                *status =
                    "Backend worker disconnected (possible startup failure); check the log and restart"
                        .to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn reports_full_queue_in_status() {
        let (tx, rx) = bounded(1);
        let mut status = String::new();
        dispatch_backend_commands(
            &tx,
            vec![
                BackendCommand::CheckSession { generation: 0 },
                BackendCommand::SignOut,
            ],
            &mut status,
        );
        assert_eq!(
            rx.try_recv().ok(),
            Some(BackendCommand::CheckSession { generation: 0 })
        );
        assert!(status.contains("sign_out"), "{status}");
    }

    #[test]
    fn reports_disconnected_backend() {
        let (tx, rx) = bounded(4);
        drop(rx);
        let mut status = String::new();
        dispatch_backend_commands(
            &tx,
            vec![BackendCommand::CheckSession { generation: 0 }],
            &mut status,
        );
        assert!(status.starts_with("Backend worker disconnected"));
    }
}
