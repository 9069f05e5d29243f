//! Operator authentication: password hashing, bearer tokens and the
//! request extractor guarding protected routes.

pub mod extractor;
pub mod jwt;
pub mod operator;
pub mod password;

pub use extractor::AuthenticatedUser;
pub use jwt::{Claims, JwtManager};
pub use operator::OperatorAccount;
