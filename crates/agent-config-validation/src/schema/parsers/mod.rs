// Per-kind schema parsers

mod arrays;
mod objects;
mod primitive;

pub(super) use arrays::parse_array_schema;
pub(super) use objects::{check_variant, parse_object_schema};
pub(super) use primitive::{
    parse_any_schema, parse_boolean_schema, parse_number_schema, parse_string_schema,
};
