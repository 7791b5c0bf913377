//! Account commands.

use petal_storefront::Storefront;
use petal_storefront::error::Result;
use petal_storefront::services::SignupForm;

/// Create an account and sign in.
pub async fn signup(storefront: &Storefront, form: &SignupForm) -> Result<()> {
    let profile = storefront.signup(form).await?;
    println!("Welcome, {}!", profile.display_name());
    Ok(())
}

/// Sign in. Any guest cart is merged into the account cart.
pub async fn login(storefront: &Storefront, email: &str, password: &str) -> Result<()> {
    let profile = storefront.login(email, password).await?;
    println!("Signed in as {}.", profile.display_name());
    Ok(())
}

/// Sign out.
pub async fn logout(storefront: &Storefront) {
    storefront.logout().await;
    println!("Signed out.");
}

/// Show the signed-in profile and saved addresses.
pub async fn profile(storefront: &Storefront) -> Result<()> {
    let profile = storefront.profile().await?;

    println!("{} <{}>", profile.display_name(), profile.email);
    if let Some(phone) = &profile.phone {
        println!("Phone: {phone}");
    }
    if profile.addresses.is_empty() {
        println!("No saved addresses.");
    }
    for (index, address) in profile.addresses.iter().enumerate() {
        let marker = if address.is_default { " (default)" } else { "" };
        println!("[{index}] {}{marker}", address.one_line());
    }
    Ok(())
}
