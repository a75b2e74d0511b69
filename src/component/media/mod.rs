mod receiver;

pub use self::receiver::Receiver;
