use remit_kernel::error::{ErrorCode, ErrorKind};

mod lookup {
    use std::borrow::Cow;

    #[remit_derive::remit_error]
    pub enum LookupError {
        #[api(code = "LOOKUP_001", kind = NotFound)]
        #[error("Missing key: {key}")]
        Missing { key: String },

        #[error("Internal error{}: {message}", format_context(.context))]
        Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    }
}

mod service {
    use super::lookup::LookupError;
    use std::borrow::Cow;

    #[remit_derive::remit_error]
    pub enum ServiceError {
        #[api(transparent)]
        #[error("Lookup failed{}: {source}", format_context(.context))]
        Lookup { source: LookupError, context: Option<Cow<'static, str>> },
    }
}

use lookup::LookupError;
use service::ServiceError;

fn main() {
    let missing = LookupError::Missing { key: "a".to_owned() };
    assert_eq!(missing.code(), "LOOKUP_001");
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    let internal = LookupError::from("broken");
    assert_eq!(internal.code(), "INTERNAL_ERROR");
    assert_eq!(internal.kind(), ErrorKind::Internal);

    let wrapped = ServiceError::from(LookupError::Missing { key: "b".to_owned() });
    assert_eq!(wrapped.code(), "LOOKUP_001");
}
