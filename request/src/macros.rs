/*
 * Copyright 2024 Oxide Computer Company
 */

/**
 * Generate a request descriptor type for one RPC action.
 *
 * Scalar parameters are declared as "getter / setter : key".  Array
 * parameters are declared as "getter / setter / read_back : key => base";
 * the setter writes indexed entries under "base", the getter reads the
 * literal "key", and the read-back accessor returns the indexed entries.
 *
 * ```ignore
 * rpc_request! {
 *     pub struct CreateTaskRequest {
 *         product: "axt",
 *         version: "2017-07-21",
 *         action: "CreateTask",
 *     }
 *     scalar {
 *         command_id / set_command_id: "commandId",
 *     }
 *     array {
 *         instance_idss / set_instance_idss / instance_ids:
 *             "instanceIdss" => "instanceIds",
 *     }
 * }
 * ```
 */
#[macro_export]
macro_rules! rpc_request {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            product: $product:literal,
            version: $version:literal,
            action: $action:literal $(,)?
        }
        $(scalar {
            $(
                $(#[$smeta:meta])*
                $sget:ident / $sset:ident : $skey:literal
            ),* $(,)?
        })?
        $(array {
            $(
                $(#[$ameta:meta])*
                $aget:ident / $aset:ident / $aread:ident :
                    $akey:literal => $abase:literal
            ),* $(,)?
        })?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis struct $name {
            rpc: $crate::RpcRequest,
        }

        impl $name {
            pub const PRODUCT: &'static str = $product;
            pub const VERSION: &'static str = $version;
            pub const ACTION: &'static str = $action;

            pub const PARAMETERS: &'static [$crate::ParamSpec] = &[
                $($($crate::ParamSpec::scalar($skey),)*)?
                $($($crate::ParamSpec::array($akey, $abase),)*)?
            ];

            pub fn new() -> $name {
                $name {
                    rpc: $crate::RpcRequest::new(
                        Self::PRODUCT,
                        Self::VERSION,
                        Self::ACTION,
                    ),
                }
            }

            $($(
                $(#[$smeta])*
                pub fn $sget(&self) -> Option<&str> {
                    self.rpc.query_param($skey)
                }

                pub fn $sset<S: Into<String>>(&mut self, value: S) -> &mut Self {
                    self.rpc.add_query_param($skey, value);
                    self
                }
            )*)?

            $($(
                $(#[$ameta])*
                pub fn $aget(&self) -> Option<&str> {
                    self.rpc.query_param($akey)
                }

                pub fn $aset<I, S>(&mut self, values: I) -> &mut Self
                where
                    I: IntoIterator<Item = S>,
                    S: Into<String>,
                {
                    self.rpc.add_indexed_query_params($abase, values);
                    self
                }

                pub fn $aread(&self) -> Vec<&str> {
                    self.rpc.indexed_query_params($abase)
                }
            )*)?
        }

        impl Default for $name {
            fn default() -> $name {
                $name::new()
            }
        }

        impl $crate::Request for $name {
            fn rpc(&self) -> &$crate::RpcRequest {
                &self.rpc
            }

            fn rpc_mut(&mut self) -> &mut $crate::RpcRequest {
                &mut self.rpc
            }

            fn into_rpc(self) -> $crate::RpcRequest {
                self.rpc
            }
        }

        impl From<$name> for $crate::RpcRequest {
            fn from(r: $name) -> $crate::RpcRequest {
                r.rpc
            }
        }
    };
}

#[cfg(test)]
mod test {
    use crate::{ParamKind, ParamSpec, Request};

    crate::rpc_request! {
        /// A descriptor with one parameter of each kind.
        pub struct SampleRequest {
            product: "sample",
            version: "2020-01-01",
            action: "DoThing",
        }
        scalar {
            name / set_name: "Name",
        }
        array {
            tagss / set_tagss / tags: "Tagss" => "Tags",
        }
    }

    crate::rpc_request! {
        struct BareRequest {
            product: "sample",
            version: "2020-01-01",
            action: "Nothing",
        }
    }

    #[test]
    fn identity() {
        let r = SampleRequest::new();
        assert_eq!(r.product(), "sample");
        assert_eq!(r.version(), "2020-01-01");
        assert_eq!(r.action_name(), "DoThing");
        assert_eq!(SampleRequest::ACTION, "DoThing");
        assert_eq!(SampleRequest::default(), r);
    }

    #[test]
    fn parameters_table() {
        assert_eq!(
            SampleRequest::PARAMETERS,
            &[
                ParamSpec::scalar("Name"),
                ParamSpec { name: "Tagss", kind: ParamKind::Array { base: "Tags" } },
            ]
        );
        assert!(BareRequest::PARAMETERS.is_empty());
        assert_eq!(BareRequest::new().action_name(), "Nothing");
    }

    #[test]
    fn accessors() {
        let mut r = SampleRequest::new();
        assert_eq!(r.name(), None);

        r.set_name("x").set_tagss(vec!["a".to_string(), "b".to_string()]);

        assert_eq!(r.name(), Some("x"));
        assert_eq!(r.tags(), vec!["a", "b"]);
        assert_eq!(r.tagss(), None);
        assert_eq!(r.to_query_string(), "Name=x&Tags.1=a&Tags.2=b");
    }

    #[test]
    fn into_rpc() {
        let mut r = SampleRequest::new();
        r.set_name("x");

        let rpc: crate::RpcRequest = r.clone().into();
        assert_eq!(rpc.query_param("Name"), Some("x"));
        assert_eq!(r.into_rpc(), rpc);
    }
}
