//! End-to-end feature extraction tests
//!
//! Each test parses a complete GML document against an inline schema index
//! and checks the resulting feature tree and attached geometries.

use pretty_assertions::assert_eq;

use gmlgeom::{ComplexFeature, GmlParser, NoAnnotations, SchemaIndex, ShapeKind};

const APP_NS: &str = "http://example.com/app";

const XSD: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:app="http://example.com/app"
           xmlns:gml="http://www.opengis.net/gml/3.2"
           targetNamespace="http://example.com/app"
           elementFormDefault="qualified">
  <xs:element name="FeatureCollection" type="app:FeatureCollectionType"/>
  <xs:element name="City" type="app:CityType"/>
  <xs:complexType name="CityType">
    <xs:sequence>
      <xs:element name="name" type="xs:string"/>
      <xs:element name="pos" type="gml:PointPropertyType"/>
      <xs:element name="center" type="gml:PointPropertyType"/>
      <xs:element name="route" type="gml:CurvePropertyType"/>
      <xs:element name="area" type="gml:SurfacePropertyType"/>
      <xs:element name="extent" type="gml:MultiSurfacePropertyType"/>
      <xs:element name="stops" type="gml:MultiPointPropertyType"/>
      <xs:element name="network" type="gml:MultiCurvePropertyType"/>
      <xs:element name="shape" type="gml:GeometryPropertyType"/>
    </xs:sequence>
    <xs:attribute name="code" type="xs:string"/>
  </xs:complexType>
</xs:schema>"#;

fn schema() -> SchemaIndex {
    SchemaIndex::from_string(XSD).expect("test schema parses")
}

fn city_doc(body: &str) -> String {
    format!(
        r#"<app:City xmlns:app="http://example.com/app"
         xmlns:gml="http://www.opengis.net/gml/3.2"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         code="75">
  <app:name>Paris</app:name>
  {}
</app:City>"#,
        body
    )
}

fn parse(body: &str) -> ComplexFeature {
    let index = schema();
    let parser = GmlParser::new(&index);
    parser.parse_str(&city_doc(body)).expect("document parses")
}

#[test]
fn point_property_becomes_primary_geometry() {
    let root = parse("<app:pos><gml:Point><gml:pos>2.35 48.85</gml:pos></gml:Point></app:pos>");

    let geometry = root.geometry.as_ref().expect("primary geometry");
    assert_eq!(geometry.shape, ShapeKind::Point);
    assert_eq!(geometry.wkt, "POINT(2.35 48.85)");
    assert_eq!(geometry.spatial_ref(), "EPSG:4326");
    assert_eq!(geometry.dimension, 2);
    assert!(!geometry.is_empty);
    assert!(geometry.parsed.is_some());
    assert!(root.representative_point.is_none());

    // The wrapper element never appears in the generic tree
    assert!(root.find_features("pos").is_empty());
    assert_eq!(
        root.find_features("name")[0].text.as_deref(),
        Some("Paris")
    );
    assert_eq!(root.attribute("code").map(|a| a.value.as_str()), Some("75"));
}

#[test]
fn linestring_preserves_tuple_count_and_order() {
    let root = parse(
        "<app:route><gml:LineString><gml:posList>1 1 2 2 3 3 4 4</gml:posList></gml:LineString></app:route>",
    );

    let geometry = root.geometry.as_ref().expect("primary geometry");
    assert_eq!(geometry.shape, ShapeKind::LineString);
    assert_eq!(geometry.wkt, "LINESTRING(1 1, 2 2, 3 3, 4 4)");
}

#[test]
fn polygon_rings_exterior_first_in_source_order() {
    let root = parse(
        r#"<app:area><gml:Polygon>
      <gml:exterior><gml:LinearRing><gml:posList>0 0 10 0 10 10 0 10 0 0</gml:posList></gml:LinearRing></gml:exterior>
      <gml:interior><gml:LinearRing><gml:posList>1 1 2 1 2 2 1 2 1 1</gml:posList></gml:LinearRing></gml:interior>
      <gml:interior><gml:LinearRing><gml:posList>3 3 4 3 4 4 3 4 3 3</gml:posList></gml:LinearRing></gml:interior>
    </gml:Polygon></app:area>"#,
    );

    let geometry = root.geometry.as_ref().expect("primary geometry");
    assert_eq!(geometry.shape, ShapeKind::Polygon);
    assert_eq!(
        geometry.wkt,
        "POLYGON((0 0, 10 0, 10 10, 0 10, 0 0),(1 1, 2 1, 2 2, 1 2, 1 1),(3 3, 4 3, 4 4, 3 4, 3 3))"
    );
    match geometry.parsed.as_ref().expect("parsed polygon") {
        geo_types::Geometry::Polygon(polygon) => {
            assert_eq!(polygon.interiors().len(), 2);
        }
        other => panic!("expected a polygon, got {:?}", other),
    }
}

#[test]
fn multipolygon_members_round_trip() {
    let root = parse(
        r#"<app:extent><gml:MultiSurface>
      <gml:surfaceMember><gml:Polygon>
        <gml:exterior><gml:LinearRing><gml:posList>0 0 4 0 4 4 0 4 0 0</gml:posList></gml:LinearRing></gml:exterior>
      </gml:Polygon></gml:surfaceMember>
      <gml:surfaceMember><gml:Polygon>
        <gml:exterior><gml:LinearRing><gml:posList>10 10 14 10 14 14 10 14 10 10</gml:posList></gml:LinearRing></gml:exterior>
      </gml:Polygon></gml:surfaceMember>
    </gml:MultiSurface></app:extent>"#,
    );

    let geometry = root.geometry.as_ref().expect("primary geometry");
    assert_eq!(geometry.shape, ShapeKind::MultiPolygon);
    assert_eq!(
        geometry.wkt,
        "MULTIPOLYGON(((0 0, 4 0, 4 4, 0 4, 0 0)),((10 10, 14 10, 14 14, 10 14, 10 10)))"
    );
    match geometry.parsed.as_ref().expect("parsed multipolygon") {
        geo_types::Geometry::MultiPolygon(mp) => assert_eq!(mp.0.len(), 2),
        other => panic!("expected a multipolygon, got {:?}", other),
    }
}

#[test]
fn multipoint_members_in_source_order() {
    let root = parse(
        r#"<app:stops><gml:MultiPoint>
      <gml:pointMember><gml:Point><gml:pos>1 2</gml:pos></gml:Point></gml:pointMember>
      <gml:pointMember><gml:Point><gml:pos>3 4</gml:pos></gml:Point></gml:pointMember>
      <gml:pointMember><gml:Point><gml:pos>5 6</gml:pos></gml:Point></gml:pointMember>
    </gml:MultiPoint></app:stops>"#,
    );

    let geometry = root.geometry.as_ref().expect("primary geometry");
    assert_eq!(geometry.shape, ShapeKind::MultiPoint);
    assert_eq!(geometry.wkt, "MULTIPOINT((1 2),(3 4),(5 6))");
    match geometry.parsed.as_ref().expect("parsed multipoint") {
        geo_types::Geometry::MultiPoint(mp) => assert_eq!(mp.0.len(), 3),
        other => panic!("expected a multipoint, got {:?}", other),
    }
}

#[test]
fn multilinestring_members_delegate_like_lines() {
    let root = parse(
        r#"<app:network><gml:MultiCurve>
      <gml:curveMember><gml:LineString><gml:posList>0 0 1 1</gml:posList></gml:LineString></gml:curveMember>
      <gml:curveMember><gml:LineString><gml:posList>2 2 3 3</gml:posList></gml:LineString></gml:curveMember>
    </gml:MultiCurve></app:network>"#,
    );

    let geometry = root.geometry.as_ref().expect("primary geometry");
    assert_eq!(geometry.shape, ShapeKind::MultiLineString);
    assert_eq!(geometry.wkt, "MULTILINESTRING((0 0, 1 1),(2 2, 3 3))");
}

#[test]
fn generic_geometry_property_resolves_from_element_name() {
    let root = parse(
        r#"<app:shape><gml:Polygon>
      <gml:exterior><gml:LinearRing><gml:posList>0 0 1 0 1 1 0 0</gml:posList></gml:LinearRing></gml:exterior>
    </gml:Polygon></app:shape>"#,
    );

    let geometry = root.geometry.as_ref().expect("primary geometry");
    assert_eq!(geometry.shape, ShapeKind::Polygon);
}

#[test]
fn second_geometry_becomes_representative_point() {
    let root = parse(
        r#"<app:pos><gml:Point><gml:pos>2.35 48.85</gml:pos></gml:Point></app:pos>
  <app:center><gml:Point><gml:pos>2.5 48.9</gml:pos></gml:Point></app:center>"#,
    );

    let primary = root.geometry.as_ref().expect("primary geometry");
    assert_eq!(primary.wkt, "POINT(2.35 48.85)");

    let representative = root
        .representative_point
        .as_ref()
        .expect("representative point");
    assert_eq!(representative.wkt, "POINT(2.5 48.9)");
}

#[test]
fn xsi_type_override_wins_over_schema() {
    // app:loc is not declared in the schema at all
    let root = parse(
        r#"<app:loc xsi:type="gml:PointPropertyType"><gml:Point><gml:pos>7 8</gml:pos></gml:Point></app:loc>"#,
    );

    let geometry = root.geometry.as_ref().expect("primary geometry");
    assert_eq!(geometry.wkt, "POINT(7 8)");
    assert!(root.find_features("loc").is_empty());
}

#[test]
fn srs_name_and_id_are_captured() {
    let root = parse(
        r#"<app:pos><gml:Point gml:id="p1" srsName="urn:ogc:def:crs:EPSG::4269"><gml:pos>1 2</gml:pos></gml:Point></app:pos>"#,
    );

    let geometry = root.geometry.as_ref().expect("primary geometry");
    assert_eq!(geometry.spatial_ref(), "EPSG:4269");
    assert_eq!(geometry.id.as_deref(), Some("p1"));
}

#[test]
fn z_coordinates_dropped_by_default() {
    let root = parse(
        r#"<app:route><gml:LineString srsDimension="3"><gml:posList>1 2 100 3 4 200</gml:posList></gml:LineString></app:route>"#,
    );

    let geometry = root.geometry.as_ref().expect("primary geometry");
    assert_eq!(geometry.dimension, 3);
    assert_eq!(geometry.wkt, "LINESTRING(1 2, 3 4)");
}

#[test]
fn emit_z_option_keeps_z_in_wkt() {
    let index = schema();
    let options = gmlgeom::ParserOptions {
        emit_z: true,
        ..Default::default()
    };
    let parser = GmlParser::with_options(&index, options);
    let doc = city_doc(
        r#"<app:route><gml:LineString srsDimension="3"><gml:posList>1 2 100 3 4 200</gml:posList></gml:LineString></app:route>"#,
    );
    let root = parser.parse_str(&doc).unwrap();

    let geometry = root.geometry.as_ref().expect("primary geometry");
    assert_eq!(geometry.wkt, "LINESTRING(1 2 100, 3 4 200)");
}

#[test]
fn legacy_coordinates_element_is_normalized() {
    let root = parse(
        r#"<app:route><gml:LineString><gml:coordinates>1,2 3,4</gml:coordinates></gml:LineString></app:route>"#,
    );

    let geometry = root.geometry.as_ref().expect("primary geometry");
    assert_eq!(geometry.wkt, "LINESTRING(1 2, 3 4)");
}

#[test]
fn empty_point_stays_empty() {
    let root = parse("<app:pos><gml:Point/></app:pos>");

    let geometry = root.geometry.as_ref().expect("geometry attached");
    assert!(geometry.is_empty);
    assert_eq!(geometry.wkt, "POINT EMPTY");
    assert!(geometry.parsed.is_none());
}

#[test]
fn malformed_coordinates_keep_the_feature() {
    let root = parse("<app:pos><gml:Point><gml:pos>2.35 north</gml:pos></gml:Point></app:pos>");

    // The feature survives with its other attributes intact
    assert_eq!(
        root.find_features("name")[0].text.as_deref(),
        Some("Paris")
    );
    let geometry = root.geometry.as_ref().expect("degraded geometry");
    assert!(geometry.parsed.is_none());
    assert!(geometry.coordinate_failure.is_some());
}

#[test]
fn dimension_arity_mismatch_is_a_coordinate_failure() {
    let root = parse(
        r#"<app:route><gml:LineString srsDimension="3"><gml:posList>1 2 3 4</gml:posList></gml:LineString></app:route>"#,
    );

    let geometry = root.geometry.as_ref().expect("degraded geometry");
    assert!(geometry.parsed.is_none());
    assert!(geometry.coordinate_failure.is_some());
}

#[test]
fn unresolvable_shape_degrades_to_missing_geometry() {
    let root = parse("<app:shape><app:Blob>1 2</app:Blob></app:shape>");

    assert!(root.geometry.is_none());
    assert_eq!(
        root.find_features("name")[0].text.as_deref(),
        Some("Paris")
    );
}

#[test]
fn unresolvable_type_is_an_ordinary_feature() {
    let index = schema();
    let parser = GmlParser::new(&index);
    // app:unknown is not declared: it nests as a plain feature
    let doc = city_doc("<app:unknown><app:inner>v</app:inner></app:unknown>");
    let root = parser.parse_str(&doc).unwrap();

    let unknown = &root.find_features("unknown")[0];
    assert!(unknown.declared_type.is_none());
    assert_eq!(unknown.find_features("inner").len(), 1);
}

#[test]
fn no_schema_means_no_geometry_extraction() {
    let parser = GmlParser::new(&NoAnnotations);
    let doc = city_doc("<app:pos><gml:Point><gml:pos>2.35 48.85</gml:pos></gml:Point></app:pos>");
    let root = parser.parse_str(&doc).unwrap();

    assert!(root.geometry.is_none());
    assert_eq!(root.find_features("pos").len(), 1);
}

#[test]
fn truncated_document_is_rejected() {
    let index = schema();
    let parser = GmlParser::new(&index);
    let result =
        parser.parse_str(r#"<app:City xmlns:app="http://example.com/app"><app:name>x</app:name>"#);
    assert!(result.is_err());
}

#[test]
fn mismatched_close_tag_is_rejected() {
    let index = schema();
    let parser = GmlParser::new(&index);
    let result = parser
        .parse_str(r#"<app:City xmlns:app="http://example.com/app"><app:name>x</app:other></app:City>"#);
    assert!(result.is_err());
}

fn tree_shape(feature: &ComplexFeature) -> Vec<(String, usize)> {
    let mut out = vec![(feature.qname.to_string(), feature.children.len())];
    for nested in feature.features() {
        out.extend(tree_shape(nested));
    }
    out
}

#[test]
fn reparsing_is_byte_identical() {
    let body = r#"<app:pos><gml:Point><gml:pos>2.35 48.85</gml:pos></gml:Point></app:pos>
  <app:area><gml:Polygon>
    <gml:exterior><gml:LinearRing><gml:posList>0 0 10 0 10 10 0 10 0 0</gml:posList></gml:LinearRing></gml:exterior>
  </gml:Polygon></app:area>"#;

    let index = schema();
    let parser = GmlParser::new(&index);
    let doc = city_doc(body);

    let first = parser.parse_str(&doc).unwrap();
    let second = parser.parse_str(&doc).unwrap();

    let wkts = |root: &ComplexFeature| {
        root.all_geometries()
            .iter()
            .map(|g| g.wkt.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(wkts(&first), wkts(&second));
    assert_eq!(tree_shape(&first), tree_shape(&second));
}

#[test]
fn schema_index_reads_from_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(XSD.as_bytes()).unwrap();

    let index = SchemaIndex::from_file(file.path()).unwrap();
    assert_eq!(index.target_namespace(), Some(APP_NS));
    assert!(index.element_count() > 0);
}
