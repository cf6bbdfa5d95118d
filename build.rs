use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    // Put memory.x where the linker looks, so cortex-m-rt's link.x can
    // INCLUDE it no matter which directory cargo was started from.
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::copy("memory.x", out_dir.join("memory.x")).expect("copy memory.x into OUT_DIR");
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
}
