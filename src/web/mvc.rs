mod controller;
mod model;
mod view;

pub use controller::main as controller;
pub use model::main as model;

use maud::Markup;

/// Outcome of rendering a view path.
pub enum Page {
  Html(Markup),
  /// Path relative to `root_url`.
  Redirect(String),
}
