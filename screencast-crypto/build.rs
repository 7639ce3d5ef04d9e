fn main() {
    println!("cargo:rerun-if-env-changed=PLAYFAIR_LIB_DIR");

    // Only the `playfair` feature links the native library
    if std::env::var_os("CARGO_FEATURE_PLAYFAIR").is_none() {
        return;
    }
    if let Some(lib_dir) = std::env::var_os("PLAYFAIR_LIB_DIR") {
        println!(
            "cargo:rustc-link-search=native={}",
            std::path::Path::new(&lib_dir).display()
        );
    }
}
