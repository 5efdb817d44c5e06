// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Bitbucket Deployments
//!
//! Read-only lookup of Bitbucket Cloud deployment environments.
//!
//! ## Overview
//!
//! A deployment environment can be referred to by its server-assigned UUID
//! or by its human display name (`Production`, `staging-eu`, ...). This
//! crate accepts either and returns the canonical record:
//!
//! 1. **List** the repository environments
//! 2. **Match** the identifier against each UUID and name, first hit wins
//! 3. **Fetch** the matched environment by UUID
//! 4. **Project** the payload onto a [`DeploymentRecord`]
//!
//! Every step fails fast; nothing is cached or retried.
//!
//! ## Modules
//!
//! - [`bitbucket`]: Collaborator traits and the Bitbucket HTTP client
//! - [`resolver`]: Identifier resolution pipeline
//! - [`schema`]: Data-source attributes exposed to a configuration host
//! - [`config`]: Configuration parsing and validation
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```no_run
//! use bitbucket_deployments::{BitbucketClient, Credentials, DeploymentResolver, ResolutionInput};
//!
//! # async fn example() -> bitbucket_deployments::Result<()> {
//! let client = BitbucketClient::new(Credentials::Anonymous)?;
//! let resolver = DeploymentResolver::new(&client, &client);
//!
//! let record = resolver
//!     .resolve(&ResolutionInput::new("acme", "api", "Production"))
//!     .await?;
//! println!("{} is stage {}", record.uuid, record.stage);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod bitbucket;
pub mod cli;
pub mod config;
pub mod error;
pub mod resolver;
pub mod schema;

// ============================================================================
// Re-exports
// ============================================================================

pub use bitbucket::{
    BitbucketClient, Credentials, EnvironmentFetcher, EnvironmentLister, EnvironmentSummary,
    RawResponse,
};
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{AppConfig, ConfigParser, ConfigValidator};
pub use error::{ApiError, BitbucketError, ResolveError, Result};
pub use resolver::{DeploymentRecord, DeploymentResolver, ResolutionInput};
pub use schema::{DataSourceState, DEPLOYMENT_FIELDS};
