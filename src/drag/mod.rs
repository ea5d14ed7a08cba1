pub mod ident;
pub mod session;

pub use ident::DragRef;
pub use session::DragSession;
