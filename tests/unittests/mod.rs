// Unit tests harness
mod protocol {
    include!("protocol.rs");
}
mod slots {
    include!("slots.rs");
}
mod segments {
    include!("segments.rs");
}
mod context {
    include!("context.rs");
}
