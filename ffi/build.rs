//! Generates `postfeed.h` from the `extern "C"` surface into `OUT_DIR`.
//!
//! The source tree stays read-only during builds. Hosts copy the header
//! from the path exported as `POSTFEED_HEADER`. A failed generation only
//! warns: the library itself does not need the header to build.

use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let (Ok(crate_dir), Ok(out_dir)) = (std::env::var("CARGO_MANIFEST_DIR"), std::env::var("OUT_DIR")) else {
        return;
    };
    let crate_dir = PathBuf::from(crate_dir);
    let out = PathBuf::from(out_dir).join("postfeed.h");
    println!("cargo:rustc-env=POSTFEED_HEADER={}", out.display());

    let generated = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("POSTFEED_H")
        .with_documentation(true)
        .generate();

    match generated {
        Ok(bindings) => {
            bindings.write_to_file(out);
        }
        Err(e) => println!("cargo:warning=cbindgen could not generate postfeed.h: {e}"),
    }
}
