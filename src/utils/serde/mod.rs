mod lamports_deserializer;
pub use lamports_deserializer::*;

mod key_serializer;
pub use key_serializer::*;
