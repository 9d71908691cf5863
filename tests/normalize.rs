use chajiang_gis::{Normalizer, RegionConfig, normalize, project};
use serde_json::{Value, json};

fn town_square() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [110.83, 24.83],
                    [110.84, 24.83],
                    [110.84, 24.84],
                    [110.83, 24.84],
                    [110.83, 24.83]
                ]]
            },
            "properties": {"name": "A"}
        }]
    })
}

#[test_log::test]
fn geojson_in_degrees_is_unchanged() {
    let input = town_square();
    let output = normalize(&input).unwrap();
    assert_eq!(serde_json::to_value(&output).unwrap(), input);
}

#[test_log::test]
fn normalizing_twice_changes_nothing() {
    let once = normalize(&town_square()).unwrap();
    let twice = normalize(&serde_json::to_value(&once).unwrap()).unwrap();
    assert_eq!(once, twice);
}

#[test_log::test]
fn legacy_grid_polygon_end_to_end() {
    let input = json!({
        "features": [{
            "geometry": {"rings": [[
                [36785000, 2748500], [36786000, 2748500], [36786000, 2749500], [36785000, 2749500]
            ]]},
            "attributes": {"id": 1}
        }],
        "geometryType": "esriGeometryPolygon"
    });
    let output = normalize(&input).unwrap();

    assert_eq!(output.len(), 1);
    let feature = &output.features[0];
    assert_eq!(feature.properties.get("id"), Some(&json!(1)));

    let ring = &feature.geometry.coordinates[0];
    assert_eq!(ring.len(), 4);
    assert!((ring[0][0] - 110.8279).abs() < 1e-9);
    assert!((ring[0][1] - 24.8333).abs() < 1e-9);
    // 1000 grid units east is just under 0.01 degrees of longitude here.
    assert!((ring[1][0] - ring[0][0] - 1000.0 / 102_834.74).abs() < 1e-9);
    assert!((ring[2][1] - ring[1][1] - 1000.0 / 111_132.92).abs() < 1e-9);
    for point in ring {
        assert!(RegionConfig::default().contains(*point));
    }
}

#[test_log::test]
fn malformed_legacy_entry_is_dropped() {
    let input = json!({
        "features": [
            {
                "geometry": {"rings": [[
                    [36785000, 2748500],
                    [36786000, 2748500],
                    [36786000, 2749500]
                ]]},
                "attributes": {"id": 1}
            },
            {"geometry": {}, "attributes": {"id": 2}},
            {
                "geometry": {"rings": [[[110.8, 24.8], [110.9, 24.8], [110.9, 24.9]]]},
                "attributes": {"id": 3}
            }
        ],
        "geometryType": "esriGeometryPolygon"
    });
    let normalized = Normalizer::default().normalize(&input).unwrap();

    assert_eq!(normalized.report.input_features, 3);
    assert_eq!(normalized.collection.len(), 2);
    assert_eq!(normalized.report.dropped.len(), 1);
    assert_eq!(normalized.report.dropped[0].index, 1);
    assert_eq!(
        normalized
            .collection
            .features
            .iter()
            .map(|f| f.properties["id"].clone())
            .collect::<Vec<_>>(),
        vec![json!(1), json!(3)]
    );
}

#[test_log::test]
fn rings_keep_their_point_counts() {
    let input = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [
                        [36785000, 2748500],
                        [36790000, 2748500],
                        [36790000, 2753500],
                        [36785000, 2753500],
                        [36785000, 2748500]
                    ],
                    [[36786000, 2749000], [36787000, 2749000], [0, 0], [36786000, 2749000]],
                    []
                ]
            },
            "properties": {}
        }]
    });
    let normalized = Normalizer::default().normalize(&input).unwrap();
    let rings = &normalized.collection.features[0].geometry.coordinates;

    assert_eq!(rings.iter().map(Vec::len).collect::<Vec<_>>(), vec![5, 4, 0]);
    assert_eq!(rings[1][2], [110.8279, 24.8333]);
    assert_eq!(normalized.report.fallback_points, 1);
}

#[test_log::test]
fn geojson_foreign_members_survive() {
    let input = json!({
        "type": "FeatureCollection",
        "name": "scenic",
        "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:OGC:1.3:CRS84"}},
        "bbox": [110.83, 24.83, 110.84, 24.84],
        "features": [{
            "type": "Feature",
            "id": 7,
            "bbox": [110.83, 24.83, 110.84, 24.84],
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [110.83, 24.83],
                    [110.84, 24.83],
                    [110.84, 24.84],
                    [110.83, 24.83]
                ]]
            },
            "properties": {"name": "A"}
        }]
    });
    let output = normalize(&input).unwrap();
    assert_eq!(serde_json::to_value(&output).unwrap(), input);
}

#[test_log::test]
fn bbox_follows_converted_coordinates() {
    let input = json!({
        "type": "FeatureCollection",
        "name": "boundary",
        "bbox": [36785000, 2748500, 36786000, 2749500],
        "features": [{
            "type": "Feature",
            "bbox": [36785000, 2748500, 36786000, 2749500],
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [36785000, 2748500],
                    [36786000, 2748500],
                    [36786000, 2749500],
                    [36785000, 2748500]
                ]]
            },
            "properties": {}
        }]
    });
    let output = serde_json::to_value(normalize(&input).unwrap()).unwrap();
    assert_eq!(output["name"], "boundary");

    for bbox in [&output["bbox"], &output["features"][0]["bbox"]] {
        let bbox: Vec<f64> = bbox
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect();
        assert_eq!(bbox.len(), 4);
        assert!((bbox[0] - 110.8279).abs() < 1e-9);
        assert!((bbox[1] - 24.8333).abs() < 1e-9);
        assert!((bbox[2] - (110.8279 + 1000.0 / 102_834.74)).abs() < 1e-9);
        assert!((bbox[3] - (24.8333 + 1000.0 / 111_132.92)).abs() < 1e-9);
    }
}

#[test_log::test]
fn legacy_grid_far_from_anchor_stays_in_region() {
    let input = json!({
        "features": [{
            "geometry": {"rings": [[
                [36785000, 2748500],
                [36000001, 0],
                [36785000, 9000000],
                [40000000, 2748500]
            ]]},
            "attributes": {"id": 1}
        }],
        "geometryType": "esriGeometryPolygon"
    });
    let normalized = Normalizer::default().normalize(&input).unwrap();
    let ring = &normalized.collection.features[0].geometry.coordinates[0];

    assert_eq!(ring.len(), 4);
    for point in ring {
        assert!(RegionConfig::default().contains(*point), "{:?}", point);
    }
    assert_eq!(&ring[1..], &[[110.8279, 24.8333]; 3]);
    assert_eq!(normalized.report.fallback_points, 3);
}

#[test_log::test]
fn invalid_ring_is_emptied_not_dropped() {
    let input = json!({
        "features": [{
            "geometry": {"rings": [[[110.8, 24.8], [110.9, 24.8], [110.8, 24.8]], null]},
            "attributes": {"id": 1}
        }],
        "geometryType": "esriGeometryPolygon"
    });
    let normalized = Normalizer::default().normalize(&input).unwrap();

    assert_eq!(normalized.collection.len(), 1);
    assert!(normalized.report.dropped.is_empty());
    assert_eq!(normalized.report.replaced_rings, 1);
    let rings = &normalized.collection.features[0].geometry.coordinates;
    assert_eq!(rings.iter().map(Vec::len).collect::<Vec<_>>(), vec![3, 0]);
}

#[test_log::test]
fn raw_ring_array_becomes_one_feature() {
    let input = json!([[110.81, 24.82], [110.82, 24.82], [110.82, 24.83], [110.81, 24.82]]);
    let output = normalize(&input).unwrap();
    assert_eq!(output.len(), 1);
    assert!(output.features[0].properties.is_empty());
    assert_eq!(output.features[0].geometry.coordinates[0].len(), 4);
}

#[test_log::test]
fn non_finite_coordinates_use_the_town_center() {
    assert_eq!(project(f64::NAN, 24.0), [110.8279, 24.8333]);
    assert_eq!(project(110.0, f64::INFINITY), [110.8279, 24.8333]);
    assert_eq!(project(f64::NEG_INFINITY, f64::NAN), [110.8279, 24.8333]);
}

#[test_log::test]
fn unsupported_input_is_rejected() {
    assert!(normalize(&Value::Null).is_err());
    assert!(normalize(&json!({"features": []})).is_err());
    assert!(normalize(&json!("rings")).is_err());
}
