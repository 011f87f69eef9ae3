//! Fuentes de temas en tendencia.

mod static_source;

pub use static_source::StaticTrendingTopics;
