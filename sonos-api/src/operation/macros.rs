//! Declarative macros for UPnP operation definitions
//!
//! These macros generate the request struct, the operation type with its
//! [`UPnPOperation`](crate::operation::UPnPOperation) implementation and a
//! named constructor for the request. Constructor names are spelled out since
//! action names like `SetAVTransportURI` do not snake_case mechanically.

/// Define an operation with a hand written response parser
///
/// # Example
/// ```rust,ignore
/// define_upnp_operation! {
///     operation: PlayOperation,
///     constructor: play,
///     action: "Play",
///     service: AVTransport,
///     request: {
///         speed: String,
///     },
///     response: (),
///     payload: |req| format!("<InstanceID>{}</InstanceID><Speed>{}</Speed>", req.instance_id, escape_xml(&req.speed)),
///     parse: |_xml| Ok(()),
/// }
/// ```
#[macro_export]
macro_rules! define_upnp_operation {
    (
        operation: $op_struct:ident,
        constructor: $ctor:ident,
        action: $action:literal,
        service: $service:ident,
        request: {
            $($field:ident: $field_type:ty),* $(,)?
        },
        response: $response_type:ty,
        payload: |$req_param:ident| $payload_expr:expr,
        parse: |$xml_param:ident| $parse_expr:expr $(,)?
    ) => {
        paste::paste! {
            #[derive(serde::Serialize, Clone, Debug, PartialEq)]
            pub struct [<$op_struct Request>] {
                $(pub $field: $field_type,)*
                pub instance_id: u32,
            }

            #[derive(Debug, Clone, Copy, Default)]
            pub struct $op_struct;

            impl $crate::operation::UPnPOperation for $op_struct {
                type Request = [<$op_struct Request>];
                type Response = $response_type;

                const SERVICE: $crate::service::Service = $crate::service::Service::$service;
                const ACTION: &'static str = $action;

                fn build_payload(request: &Self::Request) -> Result<String, $crate::operation::ValidationError> {
                    $crate::operation::Validate::validate_basic(request)?;
                    let $req_param = request;
                    Ok($payload_expr)
                }

                fn parse_response(xml: &xmltree::Element) -> Result<Self::Response, $crate::error::ApiError> {
                    let $xml_param = xml;
                    $parse_expr
                }
            }

            /// Build a request for instance 0
            pub fn $ctor($($field: $field_type),*) -> [<$op_struct Request>] {
                [<$op_struct Request>] {
                    $($field,)*
                    instance_id: 0,
                }
            }
        }
    };
}

/// Define an operation whose response fields map one to one onto child elements
///
/// # Example
/// ```rust,ignore
/// define_operation_with_response! {
///     operation: GetVolumeOperation,
///     constructor: get_volume,
///     action: "GetVolume",
///     service: RenderingControl,
///     request: {
///         channel: String,
///     },
///     payload: |req| format!("<InstanceID>{}</InstanceID><Channel>{}</Channel>", req.instance_id, escape_xml(&req.channel)),
///     response: GetVolumeResponse {
///         current_volume: u8 => "CurrentVolume",
///     },
/// }
/// ```
#[macro_export]
macro_rules! define_operation_with_response {
    (
        operation: $op_struct:ident,
        constructor: $ctor:ident,
        action: $action:literal,
        service: $service:ident,
        request: {
            $($field:ident: $field_type:ty),* $(,)?
        },
        payload: |$req_param:ident| $payload_expr:expr,
        response: $response_struct:ident {
            $($resp_field:ident: $resp_type:ty => $xml_name:literal),* $(,)?
        } $(,)?
    ) => {
        $crate::define_upnp_operation! {
            operation: $op_struct,
            constructor: $ctor,
            action: $action,
            service: $service,
            request: {
                $($field: $field_type),*
            },
            response: $response_struct,
            payload: |$req_param| $payload_expr,
            parse: |xml| Ok($response_struct {
                $($resp_field: $crate::operation::child_value::<$resp_type>(xml, $xml_name),)*
            }),
        }

        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $response_struct {
            $(pub $resp_field: $resp_type,)*
        }
    };
}
