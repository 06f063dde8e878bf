//! `Literal`: how a value describes itself as a `Node`.

use std::collections::BTreeMap;

use crate::node::{Node, Scalar};

/// A value with a source-literal form.
///
/// Implemented for scalars, `Option`, `Vec`, `BTreeMap<String, _>` and, through
/// [`literal_record!`](crate::literal_record), for plain record types. Values
/// with no literal form (I/O handles, processes, non-finite floats) report
/// `Node::Opaque` and make emission fail.
pub trait Literal {
    fn to_node(&self) -> Node;
}

impl Literal for String {
    fn to_node(&self) -> Node { Node::str(self) }
}

impl Literal for str {
    fn to_node(&self) -> Node { Node::str(self) }
}

impl Literal for bool {
    fn to_node(&self) -> Node { Node::Scalar(Scalar::Bool(*self)) }
}

impl Literal for i32 {
    fn to_node(&self) -> Node { Node::Scalar(Scalar::Int(i64::from(*self))) }
}

impl Literal for i64 {
    fn to_node(&self) -> Node { Node::Scalar(Scalar::Int(*self)) }
}

impl Literal for f64 {
    fn to_node(&self) -> Node {
        if self.is_finite() { Node::Scalar(Scalar::Float(*self)) } else { Node::opaque("f64") }
    }
}

impl<T: Literal> Literal for Option<T> {
    fn to_node(&self) -> Node {
        Node::Optional(self.as_ref().map(|v| Box::new(v.to_node())))
    }
}

impl<T: Literal> Literal for Vec<T> {
    fn to_node(&self) -> Node {
        Node::Seq(self.iter().map(Literal::to_node).collect())
    }
}

impl<V: Literal> Literal for BTreeMap<String, V> {
    fn to_node(&self) -> Node {
        Node::Map(self.iter().map(|(k, v)| (Node::str(k), v.to_node())).collect())
    }
}

impl<T: Literal + ?Sized> Literal for Box<T> {
    fn to_node(&self) -> Node { (**self).to_node() }
}

impl<T: Literal + ?Sized> Literal for &T {
    fn to_node(&self) -> Node { (**self).to_node() }
}

macro_rules! opaque {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(impl Literal for $ty {
            fn to_node(&self) -> Node { Node::opaque($name) }
        })*
    };
}

opaque!(
    std::fs::File => "std::fs::File",
    std::net::TcpStream => "std::net::TcpStream",
    std::net::TcpListener => "std::net::TcpListener",
    std::io::Stdin => "std::io::Stdin",
    std::io::Stdout => "std::io::Stdout",
    std::process::Child => "std::process::Child",
);

/// Implement [`Literal`](crate::Literal) for a struct with named fields.
///
/// ```ignore
/// literal_record!("k8s_openapi::api::core::v1" => ContainerPort {
///     container_port, host_ip as "hostIP", host_port, name, protocol
/// });
/// literal_record!("k8s_openapi::api::core::v1" => PersistentVolumeClaim: resource { metadata, spec, status });
/// ```
///
/// A field's wire name defaults to the camelCase form of its identifier; `as`
/// overrides it. `: resource` marks a `k8s_openapi::Resource` whose node
/// carries the type's `apiVersion` and `kind`.
#[macro_export]
macro_rules! literal_record {
    (@json) => { ::core::option::Option::None };
    (@json $json:literal) => { ::core::option::Option::Some($json) };
    (@node $pkg:expr, $ty:ident, $self:ident, $($field:ident $(as $json:literal)?),*) => {
        $crate::Node::record($pkg, stringify!($ty), vec![
            $($crate::Field::new(
                stringify!($field),
                $crate::literal_record!(@json $($json)?),
                $crate::Literal::to_node(&$self.$field),
            )),*
        ])
    };
    ($pkg:expr => $ty:ident : resource { $($field:ident $(as $json:literal)?),* $(,)? }) => {
        impl $crate::Literal for $ty {
            fn to_node(&self) -> $crate::Node {
                $crate::literal_record!(@node $pkg, $ty, self, $($field $(as $json)?),*).with_type_meta(
                    <$ty as ::k8s_openapi::Resource>::API_VERSION,
                    <$ty as ::k8s_openapi::Resource>::KIND,
                )
            }
        }
    };
    ($pkg:expr => $ty:ident { $($field:ident $(as $json:literal)?),* $(,)? }) => {
        impl $crate::Literal for $ty {
            fn to_node(&self) -> $crate::Node {
                $crate::literal_record!(@node $pkg, $ty, self, $($field $(as $json)?),*)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Shape;

    struct Endpoint {
        port: i32,
        host_ip: Option<String>,
        tags: Vec<String>,
    }

    literal_record!("demo::v1" => Endpoint { port, host_ip as "hostIP", tags });

    #[test]
    fn record_macro_keeps_field_order_and_wire_names() {
        let p = Endpoint { port: 80, host_ip: None, tags: vec!["a".into()] };
        let Node::Record(r) = p.to_node() else { panic!("not a record") };
        assert_eq!(r.path.name, "Endpoint");
        assert_eq!(r.type_meta, None);
        let Shape::Named(fields) = r.shape else { panic!("not named") };
        let names: Vec<_> = fields.iter().map(|f| f.wire_name()).collect();
        assert_eq!(names, ["port", "hostIP", "tags"]);
        assert_eq!(fields[1].value, Node::Optional(None));
    }

    #[test]
    fn non_finite_floats_are_opaque() {
        assert!(matches!(f64::NAN.to_node(), Node::Opaque { .. }));
        assert!(matches!(f64::INFINITY.to_node(), Node::Opaque { .. }));
        assert_eq!(1.5f64.to_node(), Node::Scalar(Scalar::Float(1.5)));
    }

    #[test]
    fn maps_are_key_ordered() {
        let m: BTreeMap<String, i32> = [("b".to_string(), 2), ("a".to_string(), 1)].into_iter().collect();
        let Node::Map(entries) = m.to_node() else { panic!("not a map") };
        assert_eq!(entries[0].0, Node::str("a"));
        assert_eq!(entries[1].1, Node::Scalar(Scalar::Int(2)));
    }
}
