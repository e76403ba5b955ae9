//! Search engine implementations.

// International engines
mod arxiv;
mod bing;
mod ebay;
mod github;
mod wikipedia;

// Chinese engines
mod baidu;
mod quark;

pub use arxiv::ArXiv;
pub use bing::Bing;
pub use ebay::Ebay;
pub use github::GitHub;
pub use wikipedia::Wikipedia;

pub use baidu::Baidu;
pub use quark::Quark;
