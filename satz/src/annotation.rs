//! Field tags are comma separated lists of directives. Whitespace around a directive is ignored.
//!
//! | directive            | meaning                                                                 |
//! |----------------------|-------------------------------------------------------------------------|
//! | `-`                  | the field does not appear on wire                                       |
//! | `length:<n>`         | byte length of a text field or element count of a sequence field        |
//! | `codec:<enc>:<dec>`  | the field is written and read by two functions registered on the record |
//!
//! Directives which are not recognized are ignored so that tags can carry information for other tools.

use crate::error::LayoutError;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{alpha1, alphanumeric1, char, digit1},
    combinator::{all_consuming, map, map_res, recognize, rest, value},
    multi::{many0, separated_list0},
    sequence::{pair, preceded},
    Finish,
    IResult,
};

/// The names of a custom encode/decode pair as written in a field tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecNames {
    pub encode: String,
    pub decode: String,
}

/// The parsed form of a field tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldAnnotation {
    pub skip: bool,
    pub length: Option<usize>,
    pub codec: Option<CodecNames>,
}

#[derive(Clone)]
enum Directive<'a> {
    Skip,
    Length(&'a str),
    Codec(&'a str),
    Other,
}

fn directives(i: &str) -> IResult<&str, Vec<&str>> {
    separated_list0(char(','), take_till(|c| c == ','))(i)
}

fn directive(i: &str) -> IResult<&str, Directive> {
    alt((
        value(Directive::Skip, all_consuming(tag("-"))),
        map(preceded(tag("length:"), rest), Directive::Length),
        map(preceded(tag("codec:"), rest), Directive::Codec),
        map(rest, |_| Directive::Other),
    ))(i)
}

fn length(i: &str) -> IResult<&str, usize> {
    all_consuming(map_res(digit1, |n: &str| n.parse()))(i)
}

fn identifier(i: &str) -> IResult<&str, &str> {
    recognize(pair(alt((alpha1, tag("_"))), many0(alt((alphanumeric1, tag("_"))))))(i)
}

fn identifiers(i: &str) -> IResult<&str, Vec<&str>> {
    all_consuming(separated_list0(char(':'), identifier))(i)
}

impl FieldAnnotation {

    /// The annotation of values which are not reached through a record field
    pub const EMPTY: FieldAnnotation = FieldAnnotation { skip: false, length: None, codec: None };

    pub fn parse(input: &str) -> Result<Self, LayoutError> {
        let (_, parts) = directives(input).finish().map_err(|e| LayoutError::Malformed(e.input.to_owned()))?;
        let mut annotation = FieldAnnotation::default();
        for part in parts.into_iter().map(str::trim) {
            let (_, directive) = directive(part).finish().map_err(|e| LayoutError::Malformed(e.input.to_owned()))?;
            match directive {
                Directive::Skip => annotation.skip = true,
                Directive::Length(n) => {
                    let (_, n) = length(n).finish().map_err(|_| LayoutError::Malformed(part.to_owned()))?;
                    annotation.length = Some(n);
                },
                Directive::Codec(names) => {
                    let (_, names) = identifiers(names).finish().map_err(|_| LayoutError::Malformed(part.to_owned()))?;
                    match names[..] {
                        [encode, decode] => annotation.codec = Some(CodecNames { encode: encode.to_owned(), decode: decode.to_owned() }),
                        _ => return Err(LayoutError::CustomCodecArity(format!("`{}` names {} functions, expected an encode and a decode function", part, names.len()))),
                    }
                },
                Directive::Other => {},
            }
        }
        Ok(annotation)
    }

    /// The declared length if it is usable for text and sequences
    pub fn required_length(&self) -> Option<usize> {
        self.length.filter(|&n| n > 0)
    }

}

#[cfg(test)]
mod tests {
    use super::{CodecNames, FieldAnnotation};
    use crate::error::LayoutError;

    #[test]
    fn empty() {
        assert_eq!(FieldAnnotation::EMPTY, FieldAnnotation::parse("").unwrap());
        assert_eq!(FieldAnnotation::EMPTY, FieldAnnotation::parse(" , ,").unwrap());
    }

    #[test]
    fn directives() {
        let annotation = FieldAnnotation::parse("length:4, -").unwrap();
        assert!(annotation.skip);
        assert_eq!(Some(4), annotation.length);
        assert_eq!(None, annotation.codec);
        assert_eq!(Some(12), FieldAnnotation::parse("length:12").unwrap().length);
        assert!(FieldAnnotation::parse("-").unwrap().skip);
    }

    #[test]
    fn last_length_wins() {
        assert_eq!(Some(2), FieldAnnotation::parse("length:1,length:2").unwrap().length);
    }

    #[test]
    fn unknown_directives_are_ignored() {
        let annotation = FieldAnnotation::parse("omitempty,json:name,-x,length:3").unwrap();
        assert!(!annotation.skip);
        assert_eq!(Some(3), annotation.length);
    }

    #[test]
    fn zero_length_is_not_required_length() {
        let annotation = FieldAnnotation::parse("length:0").unwrap();
        assert_eq!(Some(0), annotation.length);
        assert_eq!(None, annotation.required_length());
    }

    #[test]
    fn malformed_length() {
        assert_eq!(Err(LayoutError::Malformed("length:1qwe".to_owned())), FieldAnnotation::parse("length:1qwe"));
        assert_eq!(Err(LayoutError::Malformed("length:hello".to_owned())), FieldAnnotation::parse("-,length:hello"));
        assert_eq!(Err(LayoutError::Malformed("length:-1".to_owned())), FieldAnnotation::parse("length:-1"));
        assert_eq!(Err(LayoutError::Malformed("length:".to_owned())), FieldAnnotation::parse("length:"));
    }

    #[test]
    fn codec() {
        let annotation = FieldAnnotation::parse("codec:write_crc:read_crc").unwrap();
        assert_eq!(Some(CodecNames { encode: "write_crc".to_owned(), decode: "read_crc".to_owned() }), annotation.codec);
    }

    #[test]
    fn codec_arity() {
        assert!(matches!(FieldAnnotation::parse("codec:write_crc"), Err(LayoutError::CustomCodecArity(_))));
        assert!(matches!(FieldAnnotation::parse("codec:"), Err(LayoutError::CustomCodecArity(_))));
        assert!(matches!(FieldAnnotation::parse("codec:a:b:c"), Err(LayoutError::CustomCodecArity(_))));
    }

    #[test]
    fn codec_names_must_be_identifiers() {
        assert!(matches!(FieldAnnotation::parse("codec:1st:second"), Err(LayoutError::Malformed(_))));
        assert!(matches!(FieldAnnotation::parse("codec:first:"), Err(LayoutError::Malformed(_))));
    }

}
