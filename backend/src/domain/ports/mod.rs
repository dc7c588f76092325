//! Domain ports.
//!
//! Driven ports (`*Repository`) are implemented by outbound adapters. Driving
//! ports are implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_ports;
mod account_repository;
mod record_ports;
mod record_repository;
mod token_repository;

pub use account_ports::{
    AccountProfile, AccountProfileCommand, AccountProfileQuery, AccountRegistration, LoginService,
    ProfileUpdate, RegistrationRequest, TokenAuthenticator,
};
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
pub use record_ports::{RecipeQuery, RecordCommand, RecordQuery};
pub use record_repository::{RecordRepository, RecordRepositoryError};
#[cfg(test)]
pub use token_repository::MockTokenRepository;
pub use token_repository::{TokenRepository, TokenRepositoryError};
