use chip8_console::boundary::{CallArg, CallValue, EngineCalls, ReturnKind};
use chip8_console::error::CallFault;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// The Emscripten `Module` object on `window`.
pub(super) struct ModuleEngine;

fn module() -> Result<JsValue, CallFault> {
    let window = web_sys::window().ok_or_else(|| CallFault::MissingEntry("window".into()))?;
    let module = js_sys::Reflect::get(&window, &JsValue::from_str("Module"))
        .map_err(|_| CallFault::MissingEntry("Module".into()))?;
    if module.is_undefined() || module.is_null() {
        return Err(CallFault::MissingEntry("Module".into()));
    }
    Ok(module)
}

fn function(target: &JsValue, name: &str) -> Option<js_sys::Function> {
    js_sys::Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
}

fn raised(entry: &str, err: JsValue) -> CallFault {
    let message = err
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| "unknown error".to_string());
    CallFault::Raised {
        entry: entry.to_string(),
        message,
    }
}

impl EngineCalls for ModuleEngine {
    fn invoke(
        &mut self,
        entry: &str,
        returns: ReturnKind,
        args: &[CallArg<'_>],
    ) -> Result<CallValue, CallFault> {
        let module = module()?;

        // String-returning exports are bound directly on `Module`.
        let result = match (returns, function(&module, entry)) {
            (ReturnKind::Text, Some(direct)) if args.is_empty() => direct
                .call0(&module)
                .map_err(|e| raised(entry, e))?,
            _ => {
                let ccall = function(&module, "ccall")
                    .ok_or_else(|| CallFault::MissingEntry("ccall".into()))?;
                let arg_types = js_sys::Array::new();
                let arg_values = js_sys::Array::new();
                for arg in args {
                    match arg {
                        CallArg::Int(v) => {
                            arg_types.push(&JsValue::from_str("number"));
                            arg_values.push(&JsValue::from(*v));
                        }
                        CallArg::Bytes(b) => {
                            arg_types.push(&JsValue::from_str("array"));
                            arg_values.push(&js_sys::Uint8Array::from(*b));
                        }
                    }
                }
                let return_type = match returns {
                    ReturnKind::Void => JsValue::NULL,
                    ReturnKind::Number => JsValue::from_str("number"),
                    ReturnKind::Text => JsValue::from_str("string"),
                };
                let call_args = js_sys::Array::of4(
                    &JsValue::from_str(entry),
                    &return_type,
                    &arg_types,
                    &arg_values,
                );
                ccall
                    .apply(&module, &call_args)
                    .map_err(|e| raised(entry, e))?
            }
        };

        let value = match returns {
            ReturnKind::Void => Some(CallValue::Void),
            ReturnKind::Number => result.as_f64().map(CallValue::Number),
            ReturnKind::Text => result.as_string().map(CallValue::Text),
        };
        value.ok_or_else(|| CallFault::UnexpectedReturn {
            entry: entry.to_string(),
        })
    }
}
