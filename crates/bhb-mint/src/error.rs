use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    rpc_request::{RpcError, RpcResponseErrorData},
    rpc_response::RpcSimulateTransactionResult,
};
use solana_sdk::{program_error::ProgramError, pubkey::Pubkey, signer::SignerError};
use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{}", verbose_solana_error(.0))]
    SolanaClient(#[from] ClientError),
    #[error(transparent)]
    SolanaProgram(#[from] ProgramError),
    #[error(transparent)]
    Signer(#[from] SignerError),
    #[error(transparent)]
    Metadata(#[from] token_metadata_ix::Error),
    #[error("failed to decode account {0}: {1}")]
    Decode(Pubkey, std::io::Error),
    #[error("failed to encode instruction data: {0}")]
    Encode(std::io::Error),
    #[error("account {0} is not a candy machine")]
    NotCandyMachine(Pubkey),
    #[error("candy machine {0} is missing its config line section")]
    MissingItemsLoaded(Pubkey),
}

/// Render an RPC error with the preflight simulation logs, when there are
/// any.
pub fn verbose_solana_error(err: &ClientError) -> String {
    use std::fmt::Write;
    if let ClientErrorKind::RpcError(RpcError::RpcResponseError {
        code,
        message,
        data,
    }) = err.kind()
    {
        let mut s = String::new();
        writeln!(s, "{} ({})", message, code).unwrap();
        if let RpcResponseErrorData::SendTransactionPreflightFailure(
            RpcSimulateTransactionResult {
                logs: Some(logs), ..
            },
        ) = data
        {
            for (i, log) in logs.iter().enumerate() {
                writeln!(s, "{}: {}", i + 1, log).unwrap();
            }
        }
        s
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_message() {
        let err = Error::Encode(std::io::Error::new(std::io::ErrorKind::WriteZero, "full"));
        assert_eq!(err.to_string(), "failed to encode instruction data: full");
    }
}
