use miqat_core::GatewayError;

pub(crate) fn handle_error(error: ureq::Error) -> GatewayError {
    match error {
        ureq::Error::Status(status, _) => GatewayError::Status { status },
        ureq::Error::Transport(transport) => GatewayError::Network {
            message: transport.to_string(),
        },
    }
}
