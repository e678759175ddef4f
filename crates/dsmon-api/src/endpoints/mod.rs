// Endpoint helpers, one file per backend resource.
//
// All of them go through the verb methods on `ApiClient`, so default
// headers and the bearer credential apply exactly as for ad-hoc calls.

mod auth;
mod data;
mod metrics;
mod system;

pub use auth::AUTHORIZATION_PATH;
