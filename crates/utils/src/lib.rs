use thiserror::Error as ThisError;

pub mod serde_base64;
pub mod serde_bs58;

pub struct B58<const N: usize>(pub [u8; N]);

#[derive(ThisError, Debug)]
pub enum Bs58Error {
    #[error(transparent)]
    Decode(#[from] bs58::decode::Error),
    #[error("invalid length, expected: {}, got: {}", expected, got)]
    Size { expected: usize, got: usize },
}

impl<const N: usize> std::str::FromStr for B58<N> {
    type Err = Bs58Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut buf = [0u8; N];
        let size = bs58::decode(s).into(&mut buf)?;
        if size != N {
            return Err(Bs58Error::Size {
                expected: N,
                got: size,
            });
        }
        Ok(Self(buf))
    }
}

pub fn bs58_decode<const N: usize>(s: &str) -> Result<[u8; N], Bs58Error> {
    Ok(s.parse::<B58<N>>()?.0)
}
