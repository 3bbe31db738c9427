/*!
Subcommand modules.

  src/cmd/
    serve.rs   (ServeArgs + execute_serve)
    list.rs    (ListArgs  + execute_list)
    call.rs    (CallArgs  + execute_call)
    shared.rs  (wiring, argument sources, coercion)
    format.rs  (human output helpers)

Each subcommand exposes one `execute_*` function returning
`anyhow::Result<()>` and taking the global `config::Overrides`.
*/

pub mod call;
pub mod format;
pub mod list;
pub mod serve;
pub mod shared;

pub use call::{CallArgs, execute_call};
pub use list::{ListArgs, execute_list};
pub use serve::{ServeArgs, execute_serve};
