//! Native solver modules loaded from a shared library.
//!
//! Both loaders speak the same C ABI: every call takes one NUL-terminated JSON
//! document and returns a string allocated by the module, which must be handed
//! back to the module's release function.
//!
//! The structured loader expects a descriptor table:
//!
//! ```text
//! const ModuleDescriptor *kvlkcl_module_descriptor(void);
//! ```
//!
//! The generic loader resolves bare symbols instead:
//!
//! ```text
//! char *kvlkcl_run_analysis(const char *request_json);
//! char *kvlkcl_create_interactive_widgets(const char *maps_json); // optional
//! void  kvlkcl_free_string(char *s);
//! ```
//!
//! `kvlkcl_run_analysis` replies with the report or `{"error": "..."}`. The
//! widgets entry point returns NULL on success and an error message otherwise.

use std::{
    collections::BTreeMap,
    ffi::{c_char, CStr, CString},
    path::Path,
};

use anyhow::{anyhow, bail, Context, Result};
use libloading::{Library, Symbol};
use serde::Deserialize;

use super::{Artifact, LoaderStrategy};
use crate::analysis::{AnalysisReport, AnalysisRequest, CircuitAnalyzer};

pub const ABI_VERSION: u32 = 1;

const DESCRIPTOR_SYMBOL: &[u8] = b"kvlkcl_module_descriptor\0";
const RUN_SYMBOL: &[u8] = b"kvlkcl_run_analysis\0";
const WIDGETS_SYMBOL: &[u8] = b"kvlkcl_create_interactive_widgets\0";
const FREE_SYMBOL: &[u8] = b"kvlkcl_free_string\0";

pub type RunAnalysisFn = unsafe extern "C" fn(*const c_char) -> *mut c_char;
pub type WidgetsFn = unsafe extern "C" fn(*const c_char) -> *mut c_char;
pub type FreeStringFn = unsafe extern "C" fn(*mut c_char);
type DescriptorFn = unsafe extern "C" fn() -> *const ModuleDescriptor;

#[repr(C)]
pub struct ModuleDescriptor {
    pub abi_version: u32,
    pub run_analysis: RunAnalysisFn,
    pub create_interactive_widgets: Option<WidgetsFn>,
    pub free_string: FreeStringFn,
}

#[derive(Clone, Copy)]
struct EntryPoints {
    run: RunAnalysisFn,
    widgets: Option<WidgetsFn>,
    free: FreeStringFn,
}

pub struct NativeModule {
    name: String,
    entry: EntryPoints,
    // Entry points are only valid while the library stays mapped.
    _library: Library,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Reply {
    Failure { error: String },
    Report(AnalysisReport),
}

impl NativeModule {
    /// Call `f` with `payload`, copy out and release the reply.
    fn call(&self, f: unsafe extern "C" fn(*const c_char) -> *mut c_char, payload: &str) -> Result<Option<String>> {
        let input = CString::new(payload).context("request contains a NUL byte")?;
        // SAFETY: `f` comes from the library held in `self`; `input` outlives the call.
        let out = unsafe { f(input.as_ptr()) };
        if out.is_null() {
            return Ok(None);
        }
        // SAFETY: the module hands back a NUL-terminated string it owns until released.
        let text = unsafe { CStr::from_ptr(out) }.to_string_lossy().into_owned();
        // SAFETY: `out` was allocated by this module and is released exactly once.
        unsafe { (self.entry.free)(out) };
        Ok(Some(text))
    }
}

impl CircuitAnalyzer for NativeModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn run_analysis(&self, request: &AnalysisRequest<'_>) -> Result<AnalysisReport> {
        let payload = serde_json::to_string(&request.to_wire())?;
        let reply = self
            .call(self.entry.run, &payload)?
            .ok_or_else(|| anyhow!("{} returned no result", self.name))?;
        match serde_json::from_str::<Reply>(&reply).context("decoding analysis reply")? {
            Reply::Failure { error } => bail!(error),
            Reply::Report(report) => Ok(report),
        }
    }

    fn create_interactive_widgets(
        &self,
        node_voltages: &BTreeMap<String, f64>,
        branches: &BTreeMap<String, f64>,
    ) -> Option<Result<()>> {
        let widgets = self.entry.widgets?;
        let payload = serde_json::json!({
            "node_voltage_dict": node_voltages,
            "branch_dict": branches,
        })
        .to_string();
        Some(match self.call(widgets, &payload) {
            Ok(None) => Ok(()),
            Ok(Some(message)) => Err(anyhow!(message)),
            Err(e) => Err(e),
        })
    }
}

fn open(artifact: Option<&Artifact>) -> Result<Library> {
    let artifact = artifact.ok_or_else(|| anyhow!("no module file to load"))?;
    open_path(artifact.path())
}

fn open_path(path: &Path) -> Result<Library> {
    // SAFETY: loading runs the library's initializers; the module is trusted by configuration.
    unsafe { Library::new(path) }.with_context(|| format!("opening {}", path.display()))
}

/// Loads a module exporting `kvlkcl_module_descriptor`.
pub struct StructuredLoader;

impl LoaderStrategy for StructuredLoader {
    fn name(&self) -> &str {
        "structured"
    }

    fn load(&self, artifact: Option<&Artifact>) -> Result<Box<dyn CircuitAnalyzer>> {
        let library = open(artifact)?;
        let entry = {
            // SAFETY: the symbol type matches the descriptor ABI.
            let descriptor: Symbol<DescriptorFn> = unsafe { library.get(DESCRIPTOR_SYMBOL) }
                .context("missing kvlkcl_module_descriptor")?;
            // SAFETY: the descriptor is static data inside the library.
            let table = unsafe { descriptor().as_ref() }
                .ok_or_else(|| anyhow!("module descriptor is null"))?;
            if table.abi_version != ABI_VERSION {
                bail!("unsupported module ABI {} (expected {})", table.abi_version, ABI_VERSION);
            }
            EntryPoints {
                run: table.run_analysis,
                widgets: table.create_interactive_widgets,
                free: table.free_string,
            }
        };
        Ok(Box::new(NativeModule { name: "structured module".into(), entry, _library: library }))
    }
}

/// Loads any shared library exporting the bare `kvlkcl_*` symbols.
pub struct GenericLibraryLoader;

impl LoaderStrategy for GenericLibraryLoader {
    fn name(&self) -> &str {
        "generic library"
    }

    fn load(&self, artifact: Option<&Artifact>) -> Result<Box<dyn CircuitAnalyzer>> {
        let library = open(artifact)?;
        // SAFETY: symbol types match the documented C signatures.
        let entry = unsafe {
            let run: Symbol<RunAnalysisFn> = library.get(RUN_SYMBOL).context("missing kvlkcl_run_analysis")?;
            let free: Symbol<FreeStringFn> = library.get(FREE_SYMBOL).context("missing kvlkcl_free_string")?;
            let widgets = library.get::<WidgetsFn>(WIDGETS_SYMBOL).ok().map(|s| *s);
            EntryPoints { run: *run, widgets, free: *free }
        };
        Ok(Box::new(NativeModule { name: "generic library".into(), entry, _library: library }))
    }
}
