/*!
 * tgcore - the shared request layer of a Telegram Bot API client
 *
 * Every Bot API call goes through the same steps: resolve the target chat,
 * assemble an ordered parameter set (multipart when files are uploaded),
 * dispatch one blocking HTTP request, and decode the response into the shape
 * the caller asked for: a typed object, a JSON tree or the raw body.
 *
 * ```no_run
 * use tgcore::{Configuration, Manager, Params, ReturnFormat, Target};
 *
 * let mut config = Configuration::new("123456:ABC-DEF");
 * config.set_default_target("@my_channel");
 * let mut manager = Manager::new(config).unwrap();
 *
 * let extras = Params::new().with("parse_mode", "HTML").unwrap();
 * match manager.send_message(None, "<b>Deployed</b>", Some(&extras), ReturnFormat::DomainObject) {
 *     Ok(sent) => println!("sent {:?}", sent.into_domain().map(|m| m.message_id)),
 *     Err(_) => manager.print_last_error(),
 * }
 *
 * let raw = manager
 *     .send_message(Some(Target::Id(42)), "hi", None, ReturnFormat::RawString)
 *     .unwrap();
 * println!("{}", raw.into_raw().unwrap());
 * ```
 */

pub mod configuration;
pub mod endpoint;
pub mod error;
pub mod error_surface;
pub mod formatter;
pub mod input;
pub mod manager;
pub mod params;
pub mod payload;
pub mod store;
pub mod target;
pub mod transport;
pub mod types;

// Re-export main components for easy access
pub use configuration::Configuration;
pub use endpoint::{Endpoint, TargetRule};
pub use error::Error;
pub use error_surface::ErrorRecord;
pub use formatter::{ApiErrorResponse, Formatted, ResponseFormatter, ReturnFormat};
pub use input::{InputFile, InputMedia, MediaKind};
pub use manager::Manager;
pub use params::{ParamValue, Params};
pub use payload::{build_media_group_payload, build_media_payload, build_payload};
pub use store::{MemoryStore, PropertiesStore, SettingsStore, SharedStore};
pub use target::{resolve, Target};
pub use transport::{ApiRequest, ContentType, HttpMethod, HttpTransport, Transport};
