use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use almacen_console::config::Config;
use almacen_console::models::auth::RegisterRequest;
use almacen_console::services::account::AccountService;
use almacen_console::controllers::bulk_import::BulkImportController;
use almacen_console::controllers::navigation::{
    protected_by_permission, visible_menu, AppShell, Gate, LoginController, ShellState,
};
use almacen_console::controllers::password_reset::{PasswordResetController, ResetFlow};
use almacen_console::controllers::product_form::ProductForm;
use almacen_console::controllers::product_list::{stock_status, ProductListController};
use almacen_console::services::api::ApiClient;
use almacen_console::services::products::ProductService;
use almacen_console::services::session::SessionStore;

#[derive(Parser)]
#[command(name = "console", about = "Consola de administración del inventario")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Iniciar sesión y guardar la sesión local
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Crear una cuenta nueva
    Register {
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        surname: String,
        #[arg(long)]
        lastname: String,
    },
    /// Cerrar la sesión local
    Logout,
    /// Mostrar la identidad de la sesión actual
    Whoami {
        /// Consultar al servidor en lugar del token local
        #[arg(long)]
        remote: bool,
    },
    /// Listar las secciones visibles para la sesión actual
    Menu,
    /// Operaciones sobre productos
    Products {
        #[command(subcommand)]
        command: ProductsCommand,
    },
    /// Carga masiva de productos
    Import {
        #[command(subcommand)]
        command: ImportCommand,
    },
    /// Recuperación de contraseña
    Password {
        #[command(subcommand)]
        command: PasswordCommand,
    },
}

#[derive(Subcommand)]
enum ProductsCommand {
    /// Listar productos con filtros y paginación
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        low_stock: bool,
        #[arg(long)]
        show_inactive: bool,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Mostrar un producto
    Show { id: String },
    /// Crear un producto
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        barcode: String,
        #[arg(long, default_value = "")]
        sku: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        brand: String,
        #[arg(long, default_value = "")]
        size: String,
        #[arg(long, default_value = "unidad")]
        unit: String,
        #[arg(long, default_value = "")]
        price: String,
        #[arg(long, default_value = "")]
        stock: String,
        #[arg(long, default_value = "")]
        min_stock: String,
        #[arg(long, default_value = "")]
        supplier_id: String,
        #[arg(long, default_value = "")]
        image_url: String,
    },
    /// Modificar un producto existente
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        stock: Option<String>,
        #[arg(long)]
        min_stock: Option<String>,
        #[arg(long)]
        supplier_id: Option<String>,
    },
    /// Desactivar un producto (requiere confirmación)
    Deactivate {
        id: String,
        /// Confirmar sin preguntar
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ImportCommand {
    /// Subir un archivo Excel o CSV de productos
    Upload { file: PathBuf },
    /// Descargar la plantilla de ejemplo
    Template {
        #[arg(long, default_value = "template_productos.xlsx")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum PasswordCommand {
    /// Solicitar un código OTP de restablecimiento
    Forgot { email: String },
    /// Restablecer la contraseña con un OTP de 4 dígitos
    Reset {
        otp: String,
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        confirm: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let session = Arc::new(SessionStore::at_dir(&config.session_dir));
    let api = ApiClient::new(&config.api_base_url, session.clone());

    match cli.command {
        Command::Login { email, password } => {
            let mut login = LoginController::new();
            login.email = email;
            login.password = password;
            let user = login.submit(&api).await?;
            info!("sesión iniciada");
            println!(
                "Bienvenido, {} {}",
                user.surname.as_deref().unwrap_or(""),
                user.lastname.as_deref().unwrap_or("")
            );
        }
        Command::Register {
            email,
            password,
            surname,
            lastname,
        } => {
            AccountService::register(
                &api,
                &RegisterRequest {
                    surname,
                    lastname,
                    email,
                    password,
                },
            )
            .await?;
            println!("Cuenta creada exitosamente");
        }
        Command::Logout => {
            AppShell::new(session).logout();
            println!("Sesión cerrada");
        }
        Command::Whoami { remote } => {
            if remote {
                let me = AccountService::me(&api).await?;
                println!("{}", serde_json::to_string_pretty(&me)?);
            } else {
                match AppShell::new(session.clone()).state() {
                    ShellState::Unauthenticated => println!("No hay sesión activa"),
                    ShellState::Authenticated { .. } => {
                        if let Some(user) = session.current_user() {
                            println!("{} ({})", user.email, user.role);
                            for permission in &user.permissions {
                                println!("  - {permission}");
                            }
                        }
                    }
                }
            }
        }
        Command::Menu => {
            for item in visible_menu(&session) {
                println!("{:<14} {}", item.label, item.path);
            }
        }
        Command::Products { command } => {
            run_products(command, &api, &session).await?;
        }
        Command::Import { command } => {
            run_import(command, &api, &session).await?;
        }
        Command::Password { command } => {
            run_password(command, &api).await?;
        }
    }

    Ok(())
}

async fn run_products(
    command: ProductsCommand,
    api: &ApiClient,
    session: &SessionStore,
) -> anyhow::Result<()> {
    if let Some(message) = deny_message(protected_by_permission(session, "view_products")) {
        anyhow::bail!(message);
    }

    match command {
        ProductsCommand::List {
            search,
            category,
            brand,
            low_stock,
            show_inactive,
            page_size,
            page,
        } => {
            let mut list = ProductListController::new();
            if let Some(search) = search {
                list.set_search(search);
            }
            if let Some(category) = category {
                list.set_category(category);
            }
            if let Some(brand) = brand {
                list.set_brand(brand);
            }
            list.set_low_stock(low_stock);
            list.set_show_inactive(show_inactive);
            list.set_page_size(page_size);
            list.set_page(page);
            list.load(api).await;

            if let Some(error) = &list.error {
                anyhow::bail!(error.clone());
            }
            print_product_table(&list);
        }
        ProductsCommand::Show { id } => {
            let product = ProductService::get(api, &id).await?;
            println!("{}", serde_json::to_string_pretty(&product)?);
        }
        ProductsCommand::Create {
            name,
            description,
            barcode,
            sku,
            category,
            brand,
            size,
            unit,
            price,
            stock,
            min_stock,
            supplier_id,
            image_url,
        } => {
            let mut form = ProductForm::create();
            form.name = name;
            form.description = description;
            form.barcode = barcode;
            form.sku = sku;
            form.category = category;
            form.brand = brand;
            form.size = size;
            form.unit = unit;
            form.price = price;
            form.stock = stock;
            form.min_stock = min_stock;
            form.supplier_id = supplier_id;
            form.image_url = image_url;
            form.submit(api).await?;
            println!("Producto creado exitosamente");
        }
        ProductsCommand::Edit {
            id,
            name,
            description,
            category,
            brand,
            size,
            unit,
            price,
            stock,
            min_stock,
            supplier_id,
        } => {
            let product = ProductService::get(api, &id).await?;
            let mut form = ProductForm::edit(&product);
            if let Some(v) = name {
                form.name = v;
            }
            if let Some(v) = description {
                form.description = v;
            }
            if let Some(v) = category {
                form.category = v;
            }
            if let Some(v) = brand {
                form.brand = v;
            }
            if let Some(v) = size {
                form.size = v;
            }
            if let Some(v) = unit {
                form.unit = v;
            }
            if let Some(v) = price {
                form.price = v;
            }
            if let Some(v) = stock {
                form.stock = v;
            }
            if let Some(v) = min_stock {
                form.min_stock = v;
            }
            if let Some(v) = supplier_id {
                form.supplier_id = v;
            }
            form.submit(api).await?;
            println!("Producto actualizado exitosamente");
        }
        ProductsCommand::Deactivate { id, yes } => {
            let product = ProductService::get(api, &id).await?;
            let mut list = ProductListController::new();
            list.begin_deactivate(product.id.clone(), product.name.clone());

            let confirmed = yes
                || confirm(&format!(
                    "¿Estás seguro de que deseas desactivar el producto \"{}\"?",
                    product.name
                ))?;
            if !confirmed {
                list.cancel_deactivate();
                println!("Operación cancelada");
                return Ok(());
            }

            list.confirm_deactivate(api).await?;
            println!("Producto desactivado");
        }
    }
    Ok(())
}

async fn run_import(
    command: ImportCommand,
    api: &ApiClient,
    session: &SessionStore,
) -> anyhow::Result<()> {
    if !BulkImportController::available(session) {
        anyhow::bail!("La carga masiva solo está disponible para el rol ADMIN");
    }

    match command {
        ImportCommand::Upload { file } => {
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("Nombre de archivo inválido"))?
                .to_string();
            let declared = mime_guess::from_path(&file).first_raw();
            let bytes = std::fs::read(&file)?;

            let mut import = BulkImportController::new();
            if !import.select_file(name, declared, bytes) {
                anyhow::bail!(import.error.clone().unwrap_or_default());
            }
            import.upload(api).await?;

            if let Some(result) = &import.result {
                println!("Total procesados: {}", result.summary.total);
                println!("Creados: {}", result.summary.created);
                println!("Errores: {}", result.summary.errors);
                for row in &result.errors {
                    println!("  Fila {}: {} - {}", row.index, row.name, row.error);
                }
            }
        }
        ImportCommand::Template { output } => {
            BulkImportController::download_template(api, &output).await?;
            println!("Plantilla guardada en {}", output.display());
        }
    }
    Ok(())
}

async fn run_password(command: PasswordCommand, api: &ApiClient) -> anyhow::Result<()> {
    match command {
        PasswordCommand::Forgot { email } => {
            let mut reset = PasswordResetController::new();
            reset.set_email(email);
            reset.submit_request(api).await?;
            if let Some(notice) = &reset.notice {
                println!("{notice}");
            }
        }
        PasswordCommand::Reset {
            otp,
            new_password,
            confirm,
        } => {
            let mut reset = PasswordResetController::new();
            reset.flow = ResetFlow::Reset {
                otp: Default::default(),
                new_password: String::new(),
                confirm_password: String::new(),
                dev_otp: None,
            };
            if let Some(input) = reset.otp_mut() {
                if !input.paste(&otp) {
                    anyhow::bail!("El código OTP debe ser de 4 dígitos");
                }
            }
            reset.set_new_password(new_password);
            reset.set_confirm_password(confirm);
            reset.submit_reset(api).await?;
            if let Some(notice) = &reset.notice {
                println!("{notice}");
            }
        }
    }
    Ok(())
}

fn deny_message(gate: Gate) -> Option<&'static str> {
    match gate {
        Gate::Admit => None,
        Gate::Deny { message } => Some(message),
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [s/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "s" || answer == "si" || answer == "sí")
}

fn print_product_table(list: &ProductListController) {
    println!(
        "{:<10} {:<30} {:<14} {:<12} {:>10} {:>10} {:<10} {:<8}",
        "ID", "Nombre", "Categoría", "Marca", "Precio", "Stock", "Estado", "Activo"
    );
    for product in &list.products {
        let status = stock_status(product.stock, product.min_stock);
        let id_short: String = product.id.chars().take(8).collect();
        let stock_cell = format!("{} {}", product.stock, product.unit);
        println!(
            "{:<10} {:<30} {:<14} {:<12} {:>10.2} {:>10} {:<10} {:<8}",
            id_short,
            product.name,
            product.category.as_deref().unwrap_or("-"),
            product.brand.as_deref().unwrap_or("-"),
            product.price,
            stock_cell,
            status.label(),
            if product.is_active { "Sí" } else { "No" }
        );
    }
    println!(
        "Mostrando {} - {} de {} productos",
        list.start_item(),
        list.end_item(),
        list.total
    );
    let window: Vec<String> = list
        .page_window()
        .iter()
        .map(|p| {
            if *p == list.current_page {
                format!("[{p}]")
            } else {
                p.to_string()
            }
        })
        .collect();
    if !window.is_empty() {
        println!("Páginas: {}", window.join(" "));
    }
}
