//! Azure Maps `atlas` SDK bindings behind the core map traits.
//!
//! The SDK is loaded by `index.html`; if it is missing, widget creation fails
//! with [`WidgetError::Create`] and the results page shows no map.

use crate::dom;
use eld_planner_core::{
    Camera, DataLayer, Epoch, MapFeature, MapOptions, MapSurface, MapWidget, RouteSource,
    RouteStyle, WidgetError,
};
use serde::Serialize;
use serde_json::{Value, json};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use yew::Callback;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = atlas, js_name = Map)]
    #[derive(Clone)]
    type AtlasMap;

    #[wasm_bindgen(constructor, js_namespace = atlas, js_class = "Map", catch)]
    fn new(container: &str, options: &JsValue) -> Result<AtlasMap, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn dispose(this: &AtlasMap) -> Result<(), JsValue>;

    #[wasm_bindgen(method, getter)]
    fn events(this: &AtlasMap) -> EventManager;

    #[wasm_bindgen(method, getter)]
    fn sources(this: &AtlasMap) -> SourceManager;

    #[wasm_bindgen(method, getter)]
    fn layers(this: &AtlasMap) -> LayerManager;

    type EventManager;

    #[wasm_bindgen(method, js_name = add)]
    fn add_listener(this: &EventManager, event: &str, callback: &js_sys::Function);

    type SourceManager;

    #[wasm_bindgen(method, catch, js_name = add)]
    fn add_source(this: &SourceManager, source: &DataSource) -> Result<(), JsValue>;

    type LayerManager;

    #[wasm_bindgen(method, catch, js_name = add)]
    fn add_layer(this: &LayerManager, layer: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = ["atlas", "source"])]
    type DataSource;

    #[wasm_bindgen(constructor, js_namespace = ["atlas", "source"], catch)]
    fn new(id: Option<&str>, options: &JsValue) -> Result<DataSource, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn add(this: &DataSource, data: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    fn clear(this: &DataSource) -> Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = ["atlas", "layer"])]
    type LineLayer;

    #[wasm_bindgen(constructor, js_namespace = ["atlas", "layer"], catch)]
    fn new(source: &DataSource, id: Option<&str>, options: &JsValue)
    -> Result<LineLayer, JsValue>;

    #[wasm_bindgen(method, catch, js_name = setOptions)]
    fn set_options(this: &LineLayer, options: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = ["atlas", "layer"])]
    type SymbolLayer;

    #[wasm_bindgen(constructor, js_namespace = ["atlas", "layer"], catch)]
    fn new(
        source: &DataSource,
        id: Option<&str>,
        options: &JsValue,
    ) -> Result<SymbolLayer, JsValue>;
}

/// Constructor options for `atlas.Map`.
#[must_use]
pub fn map_options_json(options: &MapOptions) -> Value {
    let mut value = json!({
        "language": options.language,
        "authOptions": {
            "authType": "subscriptionKey",
            "subscriptionKey": options.subscription_key,
        },
    });
    let camera = match options.camera {
        Camera::Fit { bounds, padding } => json!({
            "bounds": bounds.to_array(),
            "padding": padding,
        }),
        Camera::Center { position, zoom } => json!({
            "center": position,
            "zoom": zoom,
        }),
    };
    if let (Some(target), Value::Object(extra)) = (value.as_object_mut(), camera) {
        target.extend(extra);
    }
    value
}

/// `LineLayer` options for a route style.
#[must_use]
pub fn line_layer_options(style: &RouteStyle) -> Value {
    let filter = json!(["==", ["geometry-type"], "LineString"]);
    match style.gradient.as_slice() {
        [(_, color)] => json!({
            "strokeColor": color,
            "strokeWidth": style.width,
            "filter": filter,
        }),
        stops => {
            let mut expression = vec![json!("interpolate"), json!(["linear"]), json!(["line-progress"])];
            for (progress, color) in stops {
                expression.push(json!(progress));
                expression.push(json!(color));
            }
            json!({
                "strokeGradient": expression,
                "strokeWidth": style.width,
                "filter": filter,
            })
        }
    }
}

/// `SymbolLayer` options: icon and title come from each point's properties.
#[must_use]
pub fn symbol_layer_options() -> Value {
    json!({
        "filter": ["==", ["geometry-type"], "Point"],
        "iconOptions": {
            "image": ["get", "icon"],
            "allowOverlap": true,
            "ignorePlacement": true,
        },
        "textOptions": {
            "textField": ["get", "title"],
            "offset": [0, 1.5],
            "size": 12,
        },
    })
}

fn to_js(value: &Value) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

struct Installed {
    source: DataSource,
    line: LineLayer,
}

/// The widget's single data source plus its line and symbol layers, created
/// on first use (the SDK only accepts sources once the map is ready).
pub struct AtlasLayer {
    map: AtlasMap,
    installed: Option<Installed>,
}

impl AtlasLayer {
    fn install(&mut self) -> Result<&Installed, JsValue> {
        if self.installed.is_none() {
            let source = DataSource::new(None, &to_js(&json!({"lineMetrics": true}))?)?;
            self.map.sources().add_source(&source)?;
            let line_options = line_layer_options(&RouteSource::StraightLine.style());
            let line = LineLayer::new(&source, Some("route-layer"), &to_js(&line_options)?)?;
            self.map.layers().add_layer(&line)?;
            let symbols =
                SymbolLayer::new(&source, Some("marker-layer"), &to_js(&symbol_layer_options())?)?;
            self.map.layers().add_layer(&symbols)?;
            self.installed = Some(Installed { source, line });
        }
        self.installed
            .as_ref()
            .ok_or_else(|| JsValue::from_str("map data layer unavailable"))
    }

    fn try_add(&mut self, feature: &MapFeature) -> Result<(), JsValue> {
        let installed = self.install()?;
        if let MapFeature::Route(path) = feature {
            installed
                .line
                .set_options(&to_js(&line_layer_options(&path.source.style()))?)?;
        }
        installed.source.add(&to_js(&feature.to_geojson())?)
    }
}

impl DataLayer for AtlasLayer {
    fn clear(&mut self) {
        if let Err(err) = self.install().and_then(|installed| installed.source.clear()) {
            log::error!("clearing map data failed: {}", dom::js_error_message(&err));
        }
    }

    fn add(&mut self, feature: &MapFeature) {
        if let Err(err) = self.try_add(feature) {
            log::error!("adding map feature failed: {}", dom::js_error_message(&err));
        }
    }
}

pub struct AtlasWidget {
    map: AtlasMap,
    layer: AtlasLayer,
    disposed: bool,
    _ready: Closure<dyn FnMut()>,
}

impl MapWidget for AtlasWidget {
    type Layer = AtlasLayer;

    fn data_layer(&mut self) -> &mut AtlasLayer {
        &mut self.layer
    }

    fn dispose(&mut self) -> Result<(), WidgetError> {
        if self.disposed {
            return Err(WidgetError::AlreadyDisposed);
        }
        self.disposed = true;
        self.map
            .dispose()
            .map_err(|err| WidgetError::Dispose(dom::js_error_message(&err)))
    }
}

/// Creates `atlas.Map` widgets inside a fixed container element.
pub struct AtlasSurface {
    container_id: String,
    on_ready: Callback<Epoch>,
}

impl AtlasSurface {
    pub fn new(container_id: impl Into<String>, on_ready: Callback<Epoch>) -> Self {
        Self {
            container_id: container_id.into(),
            on_ready,
        }
    }
}

impl MapSurface for AtlasSurface {
    type Widget = AtlasWidget;

    fn create(&mut self, options: &MapOptions, epoch: Epoch) -> Result<AtlasWidget, WidgetError> {
        let create_err = |err: JsValue| WidgetError::Create(dom::js_error_message(&err));
        let js_options = to_js(&map_options_json(options)).map_err(create_err)?;
        let map = AtlasMap::new(&self.container_id, &js_options).map_err(create_err)?;

        let on_ready = self.on_ready.clone();
        let ready = Closure::<dyn FnMut()>::new(move || on_ready.emit(epoch));
        map.events()
            .add_listener("ready", ready.as_ref().unchecked_ref());

        Ok(AtlasWidget {
            layer: AtlasLayer {
                map: map.clone(),
                installed: None,
            },
            map,
            disposed: false,
            _ready: ready,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eld_planner_core::{BoundingBox, MapConfig};

    #[test]
    fn fit_camera_uses_bounds_and_padding() {
        let options = MapOptions {
            camera: Camera::Fit {
                bounds: BoundingBox {
                    west: -75.0,
                    south: 40.0,
                    east: -71.0,
                    north: 42.0,
                },
                padding: 80,
            },
            language: "en-US".into(),
            subscription_key: "key".into(),
        };
        let value = map_options_json(&options);
        assert_eq!(value["bounds"], json!([-75.0, 40.0, -71.0, 42.0]));
        assert_eq!(value["padding"], 80);
        assert_eq!(value["language"], "en-US");
        assert_eq!(value["authOptions"]["authType"], "subscriptionKey");
        assert!(value.get("center").is_none());
    }

    #[test]
    fn center_camera_without_waypoints() {
        let options = MapOptions {
            camera: Camera::for_waypoints(None, &MapConfig::default()),
            language: "en-US".into(),
            subscription_key: String::new(),
        };
        let value = map_options_json(&options);
        assert_eq!(value["center"], json!([-98.5795, 39.8283]));
        assert_eq!(value["zoom"], 4.0);
    }

    #[test]
    fn route_styles_map_to_line_options() {
        let driving = line_layer_options(&RouteSource::Directions.style());
        assert_eq!(
            driving["strokeGradient"],
            json!(["interpolate", ["linear"], ["line-progress"],
                   0.0, "#121b45", 0.5, "#1a2859", 1.0, "#2563eb"])
        );
        assert_eq!(driving["strokeWidth"], 6.0);

        let fallback = line_layer_options(&RouteSource::StraightLine.style());
        assert_eq!(fallback["strokeColor"], "#121b45");
        assert_eq!(fallback["strokeWidth"], 5.0);
        assert!(fallback.get("strokeGradient").is_none());
    }

    #[test]
    fn symbols_read_icon_and_title_properties() {
        let value = symbol_layer_options();
        assert_eq!(value["iconOptions"]["image"], json!(["get", "icon"]));
        assert_eq!(value["textOptions"]["textField"], json!(["get", "title"]));
    }
}
