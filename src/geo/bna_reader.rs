//! Line-delimited polygon file reader.
//!
//! Each polygon is a header line followed by one vertex line per
//! vertex:
//!
//! ```text
//! "stable_craton","rank 1","defaultDepth: 10, maxDepth: 35",5
//! -100.0,35.0
//! -95.0,35.0
//! -95.0,40.0
//! -100.0,40.0
//! -100.0,35.0
//! ```
//!
//! The third header field is a comma-separated `key: value` attribute
//! list and may be empty. Vertices are `lon,lat` pairs; the ring need
//! not repeat its first vertex. Blank lines between polygons are
//! tolerated; anything else that fails to parse is an error naming the
//! offending line.

use std::collections::HashMap;

use nom::{
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0, u32 as decimal_u32},
    combinator::map,
    multi::separated_list0,
    number::complete::double,
    sequence::{delimited, preceded, separated_pair},
    IResult, Parser,
};

use crate::hypodepth_errors::HypodepthError;

use super::{GeoCoordinate, GeoFeature};

fn parse_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c| c != '"'), char('"')).parse(input)
}

fn parse_rank(input: &str) -> IResult<&str, u32> {
    delimited(char('"'), preceded(tag("rank "), decimal_u32), char('"')).parse(input)
}

/// `"<name>","rank <n>","<attributes>",<vertexCount>`; the attribute
/// field is returned raw and parsed separately.
fn parse_header(input: &str) -> IResult<&str, (&str, u32, &str, u32)> {
    (
        parse_quoted,
        preceded(char(','), parse_rank),
        preceded(char(','), parse_quoted),
        preceded(char(','), decimal_u32),
    )
        .parse(input)
}

fn parse_attribute(input: &str) -> IResult<&str, (String, String)> {
    map(
        separated_pair(
            preceded(multispace0, take_while1(|c: char| c != ':' && c != ',')),
            char(':'),
            preceded(multispace0, take_while(|c: char| c != ',')),
        ),
        |(key, value): (&str, &str)| (key.trim().to_string(), value.trim().to_string()),
    )
    .parse(input)
}

fn parse_attributes(input: &str) -> IResult<&str, Vec<(String, String)>> {
    separated_list0(char(','), parse_attribute).parse(input)
}

/// `<lon>,<lat>`
fn parse_vertex(input: &str) -> IResult<&str, GeoCoordinate> {
    map(
        separated_pair(
            preceded(multispace0, double),
            preceded(multispace0, char(',')),
            preceded(multispace0, double),
        ),
        |(lon, lat)| GeoCoordinate::new(lat, lon),
    )
    .parse(input)
}

/// Parse every polygon of `content`.
pub(crate) fn parse_bna(content: &str) -> Result<Vec<GeoFeature>, HypodepthError> {
    let mut features = Vec::new();
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    while let Some(line) = lines.next() {
        let (rest, (name, rank, attribute_field, vertex_count)) = parse_header(line.trim())
            .map_err(|_| HypodepthError::PolygonHeaderError(line.to_string()))?;
        if !rest.trim().is_empty() {
            return Err(HypodepthError::PolygonHeaderError(line.to_string()));
        }

        let (attribute_rest, pairs) = parse_attributes(attribute_field)
            .map_err(|_| HypodepthError::PolygonHeaderError(line.to_string()))?;
        if !attribute_rest.trim().is_empty() {
            return Err(HypodepthError::PolygonHeaderError(line.to_string()));
        }
        let attributes: HashMap<String, String> = pairs.into_iter().collect();

        let mut vertices = Vec::with_capacity(vertex_count as usize);
        for _ in 0..vertex_count {
            let Some(vertex_line) = lines.next() else {
                return Err(HypodepthError::TruncatedPolygon {
                    name: name.to_string(),
                    expected: vertex_count as usize,
                    found: vertices.len(),
                });
            };
            let (vertex_rest, vertex) = parse_vertex(vertex_line.trim())
                .map_err(|_| HypodepthError::PolygonVertexError(vertex_line.to_string()))?;
            if !vertex_rest.trim().is_empty() {
                return Err(HypodepthError::PolygonVertexError(vertex_line.to_string()));
            }
            vertices.push(vertex);
        }

        features.push(GeoFeature::new(name, rank, attributes, vertices));
    }

    Ok(features)
}

#[cfg(test)]
mod bna_reader_test {
    use super::*;
    use crate::geo::GeoFeatureSet;

    const CRATON: &str = r#""stable_craton","rank 1","defaultDepth: 10, maxDepth: 35",5
-100.0,35.0
-95.0,35.0
-95.0,40.0
-100.0,40.0
-100.0,35.0
"#;

    #[test]
    fn test_parse_single_polygon() {
        let features = parse_bna(CRATON).unwrap();
        assert_eq!(features.len(), 1);

        let craton = &features[0];
        assert_eq!(craton.name(), "stable_craton");
        assert_eq!(craton.rank(), 1);
        assert_eq!(craton.vertices().len(), 5);
        assert_eq!(
            craton.attributes().get("defaultDepth").map(String::as_str),
            Some("10")
        );
        assert_eq!(
            craton.attributes().get("maxDepth").map(String::as_str),
            Some("35")
        );
        assert!(craton.contains(&GeoCoordinate::new(37.5, -97.5)));
        assert!(!craton.contains(&GeoCoordinate::new(0.0, 0.0)));
    }

    #[test]
    fn test_parse_multiple_polygons_with_blank_lines() {
        let content = format!(
            "{CRATON}\n\"subduction_zone\",\"rank 2\",\"maxDepth: 700\",4\n\
             140.0,30.0\n150.0,30.0\n150.0,45.0\n140.0,45.0\n"
        );
        let features = parse_bna(&content).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[1].name(), "subduction_zone");
        assert_eq!(features[1].attributes().len(), 1);
    }

    #[test]
    fn test_empty_attribute_field() {
        let content = "\"plain\",\"rank 1\",\"\",3\n0.0,0.0\n1.0,0.0\n1.0,1.0\n";
        let features = parse_bna(content).unwrap();
        assert!(features[0].attributes().is_empty());
    }

    #[test]
    fn test_malformed_header_is_an_error() {
        let content = "stable_craton,rank 1,defaultDepth: 10,5\n";
        assert!(matches!(
            parse_bna(content),
            Err(HypodepthError::PolygonHeaderError(_))
        ));
    }

    #[test]
    fn test_truncated_polygon_is_an_error() {
        let content = "\"short\",\"rank 1\",\"\",4\n0.0,0.0\n1.0,0.0\n";
        assert!(matches!(
            parse_bna(content),
            Err(HypodepthError::TruncatedPolygon { expected: 4, found: 2, .. })
        ));
    }

    #[test]
    fn test_malformed_vertex_is_an_error() {
        let content = "\"bad\",\"rank 1\",\"\",3\n0.0,0.0\nnot,a vertex\n1.0,1.0\n";
        assert!(matches!(
            parse_bna(content),
            Err(HypodepthError::PolygonVertexError(_))
        ));
    }

    #[test]
    fn test_feature_set_from_str() {
        let set = GeoFeatureSet::from_bna_str(CRATON).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.features()[0].name(), "stable_craton");
    }
}
