pub mod map;

#[cfg(test)]
mod tests;
