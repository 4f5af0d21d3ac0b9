// Copyright 2020,2021,2022 Cognite AS
/*!
A typed REST client. Given a model type, the client resolves its URL against
a configured endpoint, substitutes path variables, appends query parameters,
sends JSON and decodes JSON back into typed values.

## Client overview
Routing is explicit: an [`Endpoint`] maps each model's `TYPE_NAME` (or a
controller override) to a segment template such as `users/%@/orders`.
[`RouteTable`] is the stock implementation.

Every operation on [`Client`] builds the request synchronously, so malformed
templates, invalid URLs and unencodable bodies are reported straight away.
The resulting [`client::Request`] is then either awaited with `send()`, or
dispatched into a [`completion`] queue when outcomes should all be consumed
from one place (for example an application's main loop).

The client is written using async. Any std compatible async runtime should be
compatible.

```no_run
# mod i {
# cfg_if::cfg_if!{
#   if #[cfg(not(feature = "reqwest"))] {
#  pub fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
#      Ok(())
# }
# } else {
use serde::{Deserialize, Serialize};
use transporter::prelude::*;

#[derive(Debug, Deserialize, Serialize)]
struct Order {
    sku: String,
    quantity: u32,
}

impl Model for Order {
    const TYPE_NAME: &'static str = "Order";
}

# pub
fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let _ = simple_logger::init();
    let endpoint = RouteTable::new("https://api.example.com/v1")?
        .route("Order", "users/%@/orders");
    let client = ClientBuilder::default().into_client::<DefaultClient>(endpoint)?;
    let route = Route::new()
        .path_var(42)
        .query(QueryParams::new().param("limit", &10)?);
    let runtime = tokio::runtime::Runtime::new()?;
    let orders = runtime.block_on(async { client.get::<Vec<Order>>(&route)?.send().await })?;
    println!("{orders:?}");
    Ok(())
}
#   }
#  }
# }
# fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
#     i::main()
# }
```

## Crate features

* **backtrace** -
  Enable backtrace feature in anyhow (nightly only)
* **default** -
  By default no features are enabled.
* **functional** -
  Only relevant to developers: enables the functional test suite.
* **reqwest-client** -
  Enables reqwest with OpenSSL TLS support
* **reqwest-client-11** -
  Enables reqwest 0.11 with OpenSSL TLS support
* **reqwest-client-rustls** -
  Enables reqwest with RusTLS support
* **reqwest-client-11-rustls** -
  Enables reqwest 0.11 with RusTLS support
*/
#![warn(clippy::all)]

pub mod client;
pub mod codec;
pub mod completion;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod model;
pub mod resolve;
pub mod version;

// Exports for ergonomical use
pub use crate::client::{Client, ClientBuilder};
pub use crate::config::EnvironmentConfig;
pub use crate::endpoint::{Endpoint, RouteTable};
pub use crate::error::Error;
pub use crate::model::{Action, Model, PathVars, QueryParams, Route};

/// For the complete minimalist
///
/// ```no_run
/// use transporter::prelude::*;
///
/// let config = EnvironmentConfig::from_env()?;
/// let endpoint = RouteTable::from_config(&config)?;
/// # #[cfg(any(feature = "reqwest", feature = "reqwest-11"))]
/// let client = ClientBuilder::default().into_client::<DefaultClient>(endpoint)?;
/// # Ok::<(), Box<dyn std::error::Error + std::marker::Send + std::marker::Sync>>(())
/// ```
pub mod prelude {
    pub use crate::client::ClientBuilder;
    pub use crate::codec::{Ack, Json};
    pub use crate::config::EnvironmentConfig;
    pub use crate::endpoint::{Endpoint, Naming, RouteTable};
    pub use crate::http::HttpVerb;
    pub use crate::model::{Action, Model, PathVars, QueryParams, Route};
    cfg_if::cfg_if! {
        if #[cfg(feature = "reqwest")] {
            pub use reqwest::Client as DefaultClient;
        } else if #[cfg(feature = "reqwest-11")] {
            pub use reqwest_11::Client as DefaultClient;
        }
    }
}
