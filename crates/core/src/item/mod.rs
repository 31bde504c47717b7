mod key;
mod value;

pub use key::{Key, KeySchema};
pub use value::{AttributeValue, Item, Number};
