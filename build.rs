fn main() {
    // Forwards ESP-IDF cfg/link arguments when building for the espidf
    // target; emits nothing for host builds.
    embuild::espidf::sysenv::output();
}
