pub mod constants;

pub mod ident;
pub use ident::*;

pub mod span;
pub use span::*;

pub trait Spanned {
    fn span(&self) -> Span;
}

impl<T: Spanned> Spanned for Box<T> {
    fn span(&self) -> Span {
        (**self).span()
    }
}
