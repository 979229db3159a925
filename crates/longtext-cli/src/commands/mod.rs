//! Subcommand implementations

pub mod batch;
pub mod info;
pub mod justify;
pub mod layout;
pub mod stats;
pub mod validate;

use crate::cli::LayoutOptionsArgs;
use longtext::types::LayoutOptions;

impl From<LayoutOptionsArgs> for LayoutOptions {
    fn from(args: LayoutOptionsArgs) -> Self {
        LayoutOptions {
            font_size: args.font_size,
            padding: args.padding,
        }
    }
}
