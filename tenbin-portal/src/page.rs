//! Static portal pages

/// Setup page with a scan-backed network picker
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>WiFi Setup</title>
<style>
body{font-family:sans-serif;margin:0;padding:20px;background:#f4f4f4}
.card{max-width:360px;margin:auto;background:#fff;padding:20px;border-radius:8px}
input,select,button{width:100%;padding:10px;margin:6px 0;box-sizing:border-box}
button{background:#2d7ff9;color:#fff;border:0;border-radius:4px}
</style>
</head>
<body>
<div class="card">
<h2>WiFi Setup</h2>
<form action="/config" method="get">
<label>Network</label>
<select id="nets" onchange="document.getElementById('ssid').value=this.value">
<option value="">Scanning...</option>
</select>
<input id="ssid" name="ssid" placeholder="SSID" required>
<input name="password" type="password" placeholder="Password">
<button type="submit">Save</button>
</form>
</div>
<script>
fetch('/scan').then(r=>r.json()).then(list=>{
const s=document.getElementById('nets');s.innerHTML='<option value="">Choose a network</option>';
list.forEach(n=>{const o=document.createElement('option');o.value=n.ssid;
o.textContent=n.ssid+' ('+n.rssi+' dBm'+(n.secure?', secured':'')+')';s.appendChild(o);});
});
</script>
</body>
</html>
"#;

/// Shown after a successful submission
pub const SAVED_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>WiFi Setup</title></head>
<body style="font-family:sans-serif;text-align:center;padding-top:40px">
<h2>Configuration Saved!</h2>
<p>The device will now restart and join your network.</p>
</body>
</html>
"#;

/// Windows NCSI expected body
pub const WINDOWS_PROBE_BODY: &str = "Microsoft Connect Test";

/// Generic success probe body
pub const SUCCESS_PROBE_BODY: &str = "success";
